mod constraint_operation_error;
mod constraint_reference;
mod literal;
mod origin;
mod trail;
mod variable;
mod watch_status;

pub use constraint_operation_error::ConstraintOperationError;
pub use constraint_reference::ConstraintReference;
pub use literal::Literal;
pub use literal::MAX_CONSTRAINT_SIZE;
pub use origin::Origin;
pub(crate) use trail::Trail;
pub use variable::Variable;
pub use watch_status::WatchStatus;
