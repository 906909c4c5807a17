use std::fmt;

use crate::contact::ContactId;

/// Navigation targets handed to the external router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Add,
    View(ContactId),
    Edit(ContactId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Add => "/contacts/add".to_string(),
            Route::View(id) => format!("/contacts/view/{}", id),
            Route::Edit(id) => format!("/contacts/edit/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
