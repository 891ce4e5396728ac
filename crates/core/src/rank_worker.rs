//! Background ranking with supersession.
//!
//! The worker ranks at most one query at a time. Requests that queue up while
//! a scan is running are collapsed to the newest one, and responses for any
//! generation other than the latest submitted are dropped before they reach
//! the caller. A running scan is never interrupted; only its result is
//! discarded.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::ranking::{Ranker, ScoredEntry};

enum Request {
    Rank { generation: u64, query: String },
    Replace(Ranker),
}

/// Ranked results for one generation of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankResponse {
    pub generation: u64,
    pub results: Vec<ScoredEntry>,
}

pub struct RankWorker {
    requests: Option<Sender<Request>>,
    responses: Receiver<RankResponse>,
    handle: Option<JoinHandle<()>>,
    latest: Option<u64>,
}

fn run(mut ranker: Ranker, requests: Receiver<Request>, responses: Sender<RankResponse>) {
    while let Ok(request) = requests.recv() {
        let mut pending = Some(request);
        let mut newest_rank = None;

        // Collapse whatever queued up behind this request
        while let Some(request) = pending.take() {
            match request {
                Request::Replace(replacement) => ranker = replacement,
                Request::Rank { generation, query } => {
                    if let Some((skipped, _)) = newest_rank.replace((generation, query)) {
                        trace!("Superseded rank request for generation {skipped}");
                    }
                }
            }
            pending = requests.try_recv().ok();
        }

        if let Some((generation, query)) = newest_rank {
            let results = ranker.rank(&query);
            if responses.send(RankResponse { generation, results }).is_err() {
                break;
            }
        }
    }

    debug!("Rank worker stopped");
}

impl RankWorker {
    #[must_use]
    pub fn spawn(ranker: Ranker) -> Self {
        let (request_sender, request_receiver) = mpsc::channel();
        let (response_sender, response_receiver) = mpsc::channel();

        let handle = thread::spawn(move || run(ranker, request_receiver, response_sender));

        Self {
            requests: Some(request_sender),
            responses: response_receiver,
            handle: Some(handle),
            latest: None,
        }
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(Error::RankWorkerGone)?
            .send(request)
            .map_err(|_| Error::RankWorkerGone)
    }

    /// Requests a ranking of `query`, superseding any earlier request.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped.
    pub fn submit(&mut self, generation: u64, query: &str) -> Result<()> {
        self.latest = Some(generation);
        self.send(Request::Rank {
            generation,
            query: query.to_string(),
        })
    }

    /// Swaps the candidate set used for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped.
    pub fn replace_ranker(&self, ranker: Ranker) -> Result<()> {
        self.send(Request::Replace(ranker))
    }

    /// Whether a submitted request has not been answered yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Returns the response for the latest submission if it has arrived.
    ///
    /// Responses for superseded generations are drained and discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped.
    pub fn try_latest(&mut self) -> Result<Option<RankResponse>> {
        loop {
            match self.responses.try_recv() {
                Ok(response) if Some(response.generation) == self.latest => {
                    self.latest = None;
                    return Ok(Some(response));
                }
                Ok(stale) => trace!("Discarding results for generation {}", stale.generation),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(Error::RankWorkerGone),
            }
        }
    }

    /// Blocks until the response for the latest submission arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is pending or the worker thread has stopped.
    pub fn wait_latest(&mut self) -> Result<RankResponse> {
        let latest = self.latest.ok_or(Error::RankWorkerGone)?;
        loop {
            let response = self.responses.recv().map_err(|_| Error::RankWorkerGone)?;
            if response.generation == latest {
                self.latest = None;
                return Ok(response);
            }
            trace!("Discarding results for generation {}", response.generation);
        }
    }
}

impl Drop for RankWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use crate::matcher::HistoryMatcher;
    use std::sync::Arc;

    fn ranker(texts: &[&str]) -> Ranker {
        let candidates: Vec<Arc<HistoryEntry>> = texts
            .iter()
            .map(|text| Arc::new(HistoryEntry::new(*text, 0, 1)))
            .collect();
        Ranker::new(Arc::new(HistoryMatcher::default()), candidates.into())
    }

    #[test]
    fn test_only_latest_generation_is_returned() {
        let mut worker = RankWorker::spawn(ranker(&["ls", "lsblk", "pwd"]));
        worker.submit(1, "l").unwrap();
        worker.submit(2, "ls").unwrap();
        worker.submit(3, "lsb").unwrap();

        let response = worker.wait_latest().unwrap();
        assert_eq!(response.generation, 3);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].entry.text, "lsblk");
        assert!(!worker.is_pending());
        assert!(worker.try_latest().unwrap().is_none());
    }

    #[test]
    fn test_replace_ranker_applies_to_later_requests() {
        let mut worker = RankWorker::spawn(ranker(&["ls"]));
        worker.replace_ranker(ranker(&["pwd", "ps"])).unwrap();
        worker.submit(1, "").unwrap();

        let response = worker.wait_latest().unwrap();
        assert_eq!(response.results.len(), 2);
    }

    #[test]
    fn test_wait_without_submission_fails() {
        let mut worker = RankWorker::spawn(ranker(&["ls"]));
        assert!(matches!(worker.wait_latest(), Err(Error::RankWorkerGone)));
    }
}
