mod inputs;
mod repository;

pub use inputs::{
    CreateUserInput, PermissionBundle, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};
pub use repository::RbacRepository;
