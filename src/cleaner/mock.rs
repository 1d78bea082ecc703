//! Scripted in-memory transport for engine tests. State sits behind an
//! `Arc` so a test can keep a handle for assertions after the batch has
//! consumed its clone.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::{MailboxTransport, MessageId, MessageUid, TransportError};

#[derive(Default)]
struct MockState {
    // Scripted behavior
    open_failures: u32,
    pages: HashMap<String, VecDeque<Vec<MessageId>>>,
    uids: HashMap<MessageId, MessageUid>,
    store_failures: u32,
    search_drops: u32,
    expunge_always_fails: bool,
    logout_failures: u32,

    // Observed behavior
    opens: u32,
    searches: u32,
    fetches: u32,
    stores: u32,
    expunges: u32,
    logouts: u32,
    flagged: Vec<MessageUid>,
    expunged: Vec<MessageUid>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Fail the first `n` `open` calls with a transient error.
    pub fn fail_opens(&self, n: u32) {
        self.lock().open_failures = n;
    }

    /// Queue search result pages for a sender. Once the queue runs dry,
    /// further searches return no matches, which is how a real provider's
    /// chunked result set behaves after the last expunge.
    pub fn add_pages(&self, sender: &str, pages: Vec<Vec<MessageId>>) {
        self.lock()
            .pages
            .insert(sender.to_string(), pages.into_iter().collect());
    }

    /// Give every queued identifier an identity seq → uid mapping.
    pub fn map_uids_identity(&self) {
        let mut state = self.lock();
        let ids: Vec<MessageId> = state
            .pages
            .values()
            .flat_map(|q| q.iter().flatten().copied())
            .collect();
        for id in ids {
            state.uids.insert(id, MessageUid::from(id));
        }
    }

    pub fn set_uid(&self, id: MessageId, uid: MessageUid) {
        self.lock().uids.insert(id, uid);
    }

    /// Fail the first `n` `store_deleted` calls with a transient error.
    pub fn fail_stores(&self, n: u32) {
        self.lock().store_failures = n;
    }

    /// Answer the next `n` searches with a dropped-connection error.
    pub fn drop_searches(&self, n: u32) {
        self.lock().search_drops = n;
    }

    pub fn fail_expunges_forever(&self) {
        self.lock().expunge_always_fails = true;
    }

    pub fn fail_logouts(&self, n: u32) {
        self.lock().logout_failures = n;
    }

    pub fn opens(&self) -> u32 {
        self.lock().opens
    }

    pub fn searches(&self) -> u32 {
        self.lock().searches
    }

    pub fn stores(&self) -> u32 {
        self.lock().stores
    }

    pub fn expunges(&self) -> u32 {
        self.lock().expunges
    }

    pub fn logouts(&self) -> u32 {
        self.lock().logouts
    }

    /// UIDs removed by committed expunges, in removal order.
    pub fn expunged(&self) -> Vec<MessageUid> {
        self.lock().expunged.clone()
    }

    /// Every command that would have gone over the wire.
    pub fn network_calls(&self) -> u32 {
        let state = self.lock();
        state.searches + state.fetches + state.stores + state.expunges
    }

    fn transient(what: &str) -> TransportError {
        TransportError::Protocol(format!("simulated {what} failure"))
    }
}

#[async_trait]
impl MailboxTransport for MockTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.opens += 1;
        if state.open_failures > 0 {
            state.open_failures -= 1;
            return Err(Self::transient("connect"));
        }
        Ok(())
    }

    async fn search_from(&mut self, sender: &str) -> Result<Vec<MessageId>, TransportError> {
        let mut state = self.lock();
        state.searches += 1;
        if state.search_drops > 0 {
            state.search_drops -= 1;
            return Err(TransportError::Dropped("simulated logout".into()));
        }
        Ok(state
            .pages
            .get_mut(sender)
            .and_then(|q| q.pop_front())
            .unwrap_or_default())
    }

    async fn fetch_uid(&mut self, id: MessageId) -> Result<Option<MessageUid>, TransportError> {
        let mut state = self.lock();
        state.fetches += 1;
        Ok(state.uids.get(&id).copied())
    }

    async fn store_deleted(&mut self, uid: MessageUid) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.stores += 1;
        if state.store_failures > 0 {
            state.store_failures -= 1;
            return Err(Self::transient("store"));
        }
        if !state.flagged.contains(&uid) {
            state.flagged.push(uid);
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.expunges += 1;
        if state.expunge_always_fails {
            return Err(Self::transient("expunge"));
        }
        let mut flagged = std::mem::take(&mut state.flagged);
        state.expunged.append(&mut flagged);
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.logouts += 1;
        if state.logout_failures > 0 {
            state.logout_failures -= 1;
            return Err(Self::transient("logout"));
        }
        Ok(())
    }
}
