//! The contact list view: state, the operations that drive it, and the
//! worker that performs its requests.
//!
//! Each operation marks its synchronous effect on the state immediately,
//! hands the request to the worker, and applies the outcome when `pump` or
//! `settle` receives the answer. Mount, reload and delete each start a new
//! operation; answers belonging to an older operation, or arriving after
//! `unmount`, are dropped.

pub mod state;
pub mod worker;

use std::mem;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::api::ContactsApi;
use crate::contact::{Contact, ContactId};

pub use state::{Phase, ViewState};
use worker::{Completion, Job, Outcome, Worker};

const WORKER_STOPPED: &str = "Contacts service worker is not running";

pub struct ContactListView {
    state: ViewState,
    query: String,
    worker: Worker,
    /// Token of the latest operation; answers carrying another token are stale
    token: u64,
    /// Requests submitted whose answers have not been received yet
    pending: usize,
    mounted: bool,
    torn_down: bool,
}

impl ContactListView {
    pub fn new<A: ContactsApi>(api: A) -> Result<Self> {
        let worker = Worker::spawn(api).context("failed to start contacts worker")?;
        Ok(Self {
            state: ViewState::default(),
            query: String::new(),
            worker,
            token: 0,
            pending: 0,
            mounted: false,
            torn_down: false,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered_contacts(&self) -> &[Contact] {
        &self.state.filtered_contacts
    }

    /// True while any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Initial load. Only the first call has an effect.
    pub fn mount(&mut self) {
        if self.mounted || self.torn_down {
            return;
        }
        self.mounted = true;
        self.start_fetch();
    }

    /// Fetch the list again as a fresh operation.
    pub fn reload(&mut self) {
        if self.torn_down {
            return;
        }
        self.start_fetch();
    }

    /// Delete a contact, then refetch on success. Nothing changes locally
    /// until the service answers.
    pub fn delete(&mut self, id: ContactId) {
        if self.torn_down {
            return;
        }
        let token = self.next_token();
        info!(%id, "deleting contact");
        self.dispatch(token, Job::Delete(id));
    }

    /// Record the query and refilter the current contacts. Allowed while loading.
    pub fn search(&mut self, text: &str) {
        self.query = text.to_string();
        let state = mem::take(&mut self.state);
        self.state = state.search(text);
    }

    /// Apply every answer that has already arrived. Returns how many were received.
    pub fn pump(&mut self) -> usize {
        let mut received = 0;
        while self.pending > 0 {
            let Some(completion) = self.worker.try_next() else {
                break;
            };
            received += 1;
            self.receive(completion);
        }
        received
    }

    /// Block until no request is outstanding, applying answers as they arrive.
    pub fn settle(&mut self) {
        while self.pending > 0 {
            match self.worker.next_blocking() {
                Some(completion) => self.receive(completion),
                None => {
                    self.pending = 0;
                    self.fail(WORKER_STOPPED.to_string());
                }
            }
        }
    }

    /// Tear the view down. Answers still in flight are ignored.
    pub fn unmount(&mut self) {
        if self.torn_down {
            return;
        }
        debug!(pending = self.pending, "unmounting contact list view");
        self.torn_down = true;
        self.pending = 0;
        self.worker.shutdown();
    }

    fn next_token(&mut self) -> u64 {
        self.token += 1;
        self.token
    }

    fn start_fetch(&mut self) {
        let token = self.next_token();
        let state = mem::take(&mut self.state);
        self.state = state.begin_loading();
        self.dispatch(token, Job::Fetch);
    }

    fn dispatch(&mut self, token: u64, job: Job) {
        if self.worker.submit(token, job) {
            self.pending += 1;
        } else {
            self.fail(WORKER_STOPPED.to_string());
        }
    }

    fn receive(&mut self, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);

        if self.torn_down || completion.token != self.token {
            debug!(
                token = completion.token,
                current = self.token,
                "ignoring stale response"
            );
            return;
        }

        let state = mem::take(&mut self.state);
        match completion.outcome {
            Outcome::Fetched(Ok(contacts)) => {
                info!(count = contacts.len(), "contacts loaded");
                self.state = state.load_succeeded(contacts);
            }
            Outcome::Fetched(Err(err)) => {
                error!(error = %err, "fetch contacts failed");
                self.state = state.load_failed(err.to_string());
            }
            Outcome::Deleted(Ok(())) => {
                self.state = state.delete_succeeded();
                self.dispatch(completion.token, Job::Fetch);
            }
            Outcome::Deleted(Err(err)) => {
                error!(error = %err, "delete contact failed");
                self.state = state.delete_failed(err.to_string());
            }
        }
    }

    fn fail(&mut self, message: String) {
        error!(%message, "contacts request could not be issued");
        let state = mem::take(&mut self.state);
        self.state = state.load_failed(message);
    }
}

impl Drop for ContactListView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{contact, delete_error, status_error, Call, FakeApi};

    fn mounted(api: &FakeApi) -> ContactListView {
        let mut view = ContactListView::new(api.clone()).unwrap();
        view.mount();
        view
    }

    #[test]
    fn test_initial_load_success() {
        let api = FakeApi::new();
        let ann = Contact {
            id: ContactId::new("1"),
            name: Some("Ann".into()),
            mobile: Some("555".into()),
            email: Some("a@x.com".into()),
            image_url: Some("i1".into()),
        };
        api.push_list(Ok(vec![ann.clone()]));

        let mut view = mounted(&api);
        assert!(view.state().loading);
        assert_eq!(view.phase(), Phase::Loading);

        view.settle();
        assert_eq!(
            view.state(),
            &ViewState {
                loading: false,
                contacts: vec![ann.clone()],
                filtered_contacts: vec![ann],
                error_message: String::new(),
            }
        );
    }

    #[test]
    fn test_initial_load_failure() {
        let api = FakeApi::new();
        api.push_list(Err(status_error(500)));

        let mut view = mounted(&api);
        view.settle();

        assert!(view.state().contacts.is_empty());
        assert!(view.state().filtered_contacts.is_empty());
        assert!(view.state().error_message.contains("500"));
        assert_eq!(view.phase(), Phase::Error);
    }

    #[test]
    fn test_mount_only_loads_once() {
        let api = FakeApi::new();
        let mut view = mounted(&api);
        view.settle();
        view.mount();
        view.settle();
        assert_eq!(api.calls(), vec![Call::List]);
    }

    #[test]
    fn test_load_without_search_keeps_nameless_contacts() {
        let api = FakeApi::new();
        let nameless = Contact {
            id: ContactId::new("3"),
            mobile: Some("1".into()),
            ..Default::default()
        };
        api.push_list(Ok(vec![contact("1", "Ann"), nameless.clone()]));

        let mut view = mounted(&api);
        view.settle();

        assert_eq!(view.query(), "");
        assert_eq!(view.filtered_contacts().len(), 2);
        assert_eq!(view.filtered_contacts()[1], nameless);
    }

    #[test]
    fn test_search_on_loaded_view() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![
            contact("1", "Ann"),
            contact("2", "Banana"),
            Contact {
                id: ContactId::new("3"),
                mobile: Some("1".into()),
                ..Default::default()
            },
        ]));
        let mut view = mounted(&api);
        view.settle();

        view.search("an");
        assert_eq!(view.query(), "an");
        let ids: Vec<_> = view.filtered_contacts().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let first = view.state().clone();
        view.search("an");
        assert_eq!(view.state(), &first);

        view.search("");
        assert_eq!(view.filtered_contacts().len(), 2);
        assert_eq!(view.state().contacts.len(), 3);
    }

    #[test]
    fn test_delete_success_refetches_and_drops_filter() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("7", "Ann"), contact("8", "Bob"), contact("9", "Annie")]));
        api.push_list(Ok(vec![contact("8", "Bob"), contact("9", "Annie")]));
        let mut view = mounted(&api);
        view.settle();

        view.search("ann");
        assert_eq!(view.filtered_contacts().len(), 2);

        view.delete(ContactId::new("7"));
        view.settle();

        let remaining = vec![contact("8", "Bob"), contact("9", "Annie")];
        assert_eq!(view.state().contacts, remaining);
        assert_eq!(view.state().filtered_contacts, remaining);
        assert_eq!(view.query(), "ann");
        assert!(!view.state().loading);
        assert_eq!(
            api.calls(),
            vec![Call::List, Call::Delete(ContactId::new("7")), Call::List]
        );
    }

    #[test]
    fn test_delete_failure_skips_refetch() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("7", "Ann")]));
        api.push_delete(Err(delete_error(404)));
        let mut view = mounted(&api);
        view.settle();

        view.delete(ContactId::new("7"));
        assert!(!view.state().loading);
        view.settle();

        assert!(view.state().contacts.is_empty());
        assert!(view.state().filtered_contacts.is_empty());
        assert!(view.state().error_message.contains("404"));
        assert!(view.state().error_message.starts_with("Delete failed:"));
        assert_eq!(api.calls(), vec![Call::List, Call::Delete(ContactId::new("7"))]);
    }

    #[test]
    fn test_refetch_failure_after_delete() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("7", "Ann")]));
        api.push_list(Err(status_error(503)));
        let mut view = mounted(&api);
        view.settle();

        view.delete(ContactId::new("7"));
        view.settle();

        assert_eq!(view.phase(), Phase::Error);
        assert!(view.state().error_message.contains("503"));
    }

    #[test]
    fn test_error_cleared_by_successful_delete_cycle() {
        let api = FakeApi::new();
        api.push_list(Err(status_error(500)));
        api.push_list(Ok(vec![contact("2", "Bo")]));
        let mut view = mounted(&api);
        view.settle();
        assert_eq!(view.phase(), Phase::Error);

        view.delete(ContactId::new("1"));
        view.settle();

        assert_eq!(view.phase(), Phase::Idle);
        assert_eq!(view.state().error_message, "");
        assert_eq!(view.filtered_contacts().len(), 1);
    }

    #[test]
    fn test_search_while_loading_is_overwritten_by_response() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("1", "Ann"), contact("2", "Bob")]));
        let mut view = mounted(&api);

        view.search("bob");
        assert!(view.state().loading);
        view.settle();

        assert_eq!(view.query(), "bob");
        assert_eq!(view.filtered_contacts().len(), 2);
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("1", "Old")]));
        api.push_list(Ok(vec![contact("2", "New")]));
        let mut view = mounted(&api);
        view.reload();
        view.settle();

        assert_eq!(view.state().contacts, vec![contact("2", "New")]);
        assert_eq!(api.calls(), vec![Call::List, Call::List]);
    }

    #[test]
    fn test_unmount_ignores_late_responses() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("1", "Ann")]));
        let mut view = mounted(&api);
        view.unmount();

        assert!(!view.is_busy());
        assert_eq!(view.pump(), 0);
        view.settle();
        assert!(view.state().contacts.is_empty());
        assert!(view.state().loading);

        view.reload();
        view.delete(ContactId::new("1"));
        assert!(!view.is_busy());
    }

    #[test]
    fn test_pump_applies_ready_answers() {
        let api = FakeApi::new();
        api.push_list(Ok(vec![contact("1", "Ann")]));
        let mut view = mounted(&api);

        let mut received = 0;
        while view.is_busy() {
            received += view.pump();
            std::thread::yield_now();
        }

        assert_eq!(received, 1);
        assert_eq!(view.filtered_contacts().len(), 1);
    }
}
