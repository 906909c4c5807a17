use crate::contact::Contact;
use crate::search;

/// Where the view is in its fetch cycle, derived from [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Error,
}

/// Everything the list view renders from.
///
/// Every transition consumes the prior state and returns the next one. Fetch
/// outcomes replace the whole state; only `begin_loading` and `search` carry
/// fields over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub loading: bool,
    /// Last full set received from the service
    pub contacts: Vec<Contact>,
    /// Subset of `contacts` matching the last search, or all of them after a fetch
    pub filtered_contacts: Vec<Contact>,
    /// Empty when there is no error
    pub error_message: String,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if !self.error_message.is_empty() {
            Phase::Error
        } else {
            Phase::Idle
        }
    }

    pub fn begin_loading(self) -> Self {
        Self {
            loading: true,
            ..self
        }
    }

    /// The active query is deliberately not reapplied: the filtered list shows
    /// everything until the next search.
    pub fn load_succeeded(self, contacts: Vec<Contact>) -> Self {
        Self {
            loading: false,
            filtered_contacts: contacts.clone(),
            contacts,
            error_message: String::new(),
        }
    }

    pub fn load_failed(self, message: impl Into<String>) -> Self {
        Self {
            loading: false,
            contacts: Vec::new(),
            filtered_contacts: Vec::new(),
            error_message: message.into(),
        }
    }

    /// The delete was accepted; a refetch follows.
    pub fn delete_succeeded(self) -> Self {
        self.begin_loading()
    }

    pub fn delete_failed(self, message: impl Into<String>) -> Self {
        self.load_failed(message)
    }

    /// Filter `contacts` (never the previous filtered list) by name.
    pub fn search(self, query: &str) -> Self {
        let filtered_contacts = search::filter_by_name(&self.contacts, query);
        Self {
            filtered_contacts,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactId;

    fn named(id: &str, name: &str) -> Contact {
        Contact {
            id: ContactId::new(id),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn loaded() -> ViewState {
        ViewState::default()
            .begin_loading()
            .load_succeeded(vec![named("1", "Ann"), named("2", "Banana"), named("3", "Cy")])
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(ViewState::default().phase(), Phase::Idle);
    }

    #[test]
    fn test_load_success_resets_everything() {
        let state = ViewState::default()
            .load_failed("Error: 500 Internal Server Error")
            .begin_loading();
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.contacts.is_empty());

        let data = vec![named("1", "Ann")];
        let state = state.load_succeeded(data.clone());
        assert_eq!(
            state,
            ViewState {
                loading: false,
                contacts: data.clone(),
                filtered_contacts: data,
                error_message: String::new(),
            }
        );
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_load_failure_discards_contacts() {
        let state = loaded().begin_loading().load_failed("Error: 500 Internal Server Error");
        assert!(state.contacts.is_empty());
        assert!(state.filtered_contacts.is_empty());
        assert!(!state.loading);
        assert_eq!(state.phase(), Phase::Error);
    }

    #[test]
    fn test_search_filters_from_full_list() {
        let state = loaded().search("b");
        assert_eq!(state.filtered_contacts, vec![named("2", "Banana")]);

        // widening the query draws from `contacts`, not the narrowed list
        let state = state.search("a");
        assert_eq!(state.filtered_contacts.len(), 2);
        assert_eq!(state.contacts.len(), 3);
    }

    #[test]
    fn test_search_keeps_other_fields() {
        let state = loaded().begin_loading().search("cy");
        assert!(state.loading);
        assert_eq!(state.filtered_contacts, vec![named("3", "Cy")]);
    }

    #[test]
    fn test_search_is_idempotent() {
        let once = loaded().search("an");
        let twice = once.clone().search("an");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fetch_after_search_shows_everything() {
        let state = loaded().search("ann");
        assert_eq!(state.filtered_contacts.len(), 1);

        let state = state.delete_succeeded();
        assert_eq!(state.phase(), Phase::Loading);
        let state = state.load_succeeded(vec![named("1", "Ann"), named("3", "Cy")]);
        assert_eq!(state.filtered_contacts, state.contacts);
    }

    #[test]
    fn test_delete_failure_from_error_stays_error() {
        let state = ViewState::default()
            .load_failed("first")
            .delete_failed("Delete failed: 404 Not Found");
        assert_eq!(state.error_message, "Delete failed: 404 Not Found");
        assert_eq!(state.phase(), Phase::Error);
    }
}
