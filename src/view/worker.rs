//! Background thread that owns the contacts service client.
//!
//! Requests are queued in order and answered one at a time; every answer
//! carries the operation token it was submitted with.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::debug;

use crate::api::{ApiError, ContactsApi};
use crate::contact::{Contact, ContactId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Fetch,
    Delete(ContactId),
}

#[derive(Debug)]
pub enum Outcome {
    Fetched(Result<Vec<Contact>, ApiError>),
    Deleted(Result<(), ApiError>),
}

#[derive(Debug)]
pub struct Completion {
    pub token: u64,
    pub outcome: Outcome,
}

pub struct Worker {
    jobs: Option<Sender<(u64, Job)>>,
    completions: Receiver<Completion>,
}

impl Worker {
    pub fn spawn<A: ContactsApi>(api: A) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<(u64, Job)>();
        let (done_tx, done_rx) = mpsc::channel();

        thread::Builder::new()
            .name("contacts-worker".to_string())
            .spawn(move || {
                for (token, job) in job_rx {
                    debug!(token, ?job, "running request");
                    let outcome = match job {
                        Job::Fetch => Outcome::Fetched(api.list_contacts()),
                        Job::Delete(id) => Outcome::Deleted(api.delete_contact(&id)),
                    };
                    if done_tx.send(Completion { token, outcome }).is_err() {
                        break;
                    }
                }
                debug!("contacts worker stopped");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
        })
    }

    /// Queue a request. Returns false once the worker is gone.
    pub fn submit(&self, token: u64, job: Job) -> bool {
        match &self.jobs {
            Some(jobs) => jobs.send((token, job)).is_ok(),
            None => false,
        }
    }

    pub fn try_next(&self) -> Option<Completion> {
        self.completions.try_recv().ok()
    }

    /// Block until the next answer; `None` if the worker has stopped.
    pub fn next_blocking(&self) -> Option<Completion> {
        self.completions.recv().ok()
    }

    /// Stop accepting requests. An in-flight request is not aborted; its
    /// answer is dropped when the worker finds nobody listening.
    pub fn shutdown(&mut self) {
        self.jobs = None;
    }
}
