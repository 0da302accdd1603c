//! Who may do what. Every gated endpoint names its [`Operation`]; the
//! allow-list lives here and nowhere else.

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitRating,
    ReadOwnRatings,
    ReadStoreRatings,
    ReadStores,
    CreateStore,
    ListUsers,
    ManageUsers,
    ViewDashboard,
}

const ANY_ROLE: &[Role] = &Role::ALL;

impl Operation {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::SubmitRating => &[Role::Normal],
            Operation::ReadOwnRatings | Operation::ReadStoreRatings | Operation::ReadStores => {
                ANY_ROLE
            }
            Operation::CreateStore
            | Operation::ListUsers
            | Operation::ManageUsers
            | Operation::ViewDashboard => &[Role::Admin],
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// Operations that change rows. `authorize` re-checks the caller's stored
    /// role for these instead of trusting the token claim alone.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::SubmitRating | Operation::CreateStore | Operation::ManageUsers
        )
    }
}
