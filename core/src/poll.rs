//! Shared poll state: vote tallies and the live activity feed.
//!
//! The store is process-wide and shared by every session. All mutation goes
//! through [`PollStore::record_vote`], which performs the increment, prepend,
//! newest-flag maintenance, and cap under a single lock acquisition.

use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::display::feed_address;

/// Maximum number of activity entries retained; older entries are dropped.
pub const FEED_CAP: usize = 20;

/// One of the two poll options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    /// The contract entry point this choice invokes.
    #[must_use]
    pub fn contract_fn(&self) -> &'static str {
        match self {
            VoteChoice::Yes => "vote_yes",
            VoteChoice::No => "vote_no",
        }
    }
}

impl std::fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteChoice::Yes => write!(f, "YES"),
            VoteChoice::No => write!(f, "NO"),
        }
    }
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "y" => Ok(VoteChoice::Yes),
            "no" | "n" => Ok(VoteChoice::No),
            other => Err(format!("Unknown vote '{other}'. Use 'yes' or 'no'.")),
        }
    }
}

/// Running vote counts. Monotonically non-decreasing after the seed baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tallies {
    pub yes: u32,
    pub no: u32,
}

impl Tallies {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.yes + self.no
    }

    /// Rounded percentage of YES votes; 50 when no votes have been cast.
    #[must_use]
    pub fn yes_percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 50;
        }
        ((self.yes as f64 / total as f64) * 100.0).round() as u32
    }
}

/// One entry in the live activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    /// Shortened voter address ("GD4Q…F7KL").
    pub address: String,
    pub choice: VoteChoice,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    /// Set on the most recent entry only.
    pub is_new: bool,
}

struct PollInner {
    tallies: Tallies,
    feed: Vec<ActivityEntry>,
}

/// Single-writer store for tallies and the activity feed.
pub struct PollStore {
    inner: Mutex<PollInner>,
}

impl PollStore {
    /// An empty store with the given starting tallies.
    pub fn new(tallies: Tallies) -> Self {
        Self::with_feed(tallies, Vec::new())
    }

    /// A store with starting tallies and a pre-populated feed.
    /// The feed is capped to [`FEED_CAP`] entries, newest first.
    pub fn with_feed(tallies: Tallies, mut feed: Vec<ActivityEntry>) -> Self {
        feed.truncate(FEED_CAP);
        Self {
            inner: Mutex::new(PollInner { tallies, feed }),
        }
    }

    /// The deployment's seed baseline: 47/31 tallies and twelve feed entries.
    pub fn seeded() -> Self {
        const PREFIXES: [&str; 12] = [
            "GD4Q", "GBZM", "GCTN", "GDWX", "GEAX", "GFBY", "GGCZ", "GHDA", "GIEB", "GJFC",
            "GKGD", "GLHE",
        ];
        const CHOICES: [VoteChoice; 12] = [
            VoteChoice::Yes,
            VoteChoice::No,
            VoteChoice::Yes,
            VoteChoice::Yes,
            VoteChoice::No,
            VoteChoice::Yes,
            VoteChoice::No,
            VoteChoice::Yes,
            VoteChoice::Yes,
            VoteChoice::No,
            VoteChoice::Yes,
            VoteChoice::No,
        ];
        const MINUTES_AGO: [i64; 12] = [2, 7, 15, 23, 38, 51, 67, 84, 102, 118, 141, 159];

        let now = Utc::now();
        let feed = (0..12)
            .map(|i| ActivityEntry {
                address: format!("{}…F7KL", PREFIXES[i]),
                choice: CHOICES[i],
                timestamp: now - Duration::minutes(MINUTES_AGO[i]),
                hash: format!("{:02x}", i + 1).repeat(32),
                is_new: false,
            })
            .collect();

        Self::with_feed(Tallies { yes: 47, no: 31 }, feed)
    }

    /// Record one vote: increment the matching tally and prepend a feed entry
    /// built from the voter's address, atomically with respect to readers.
    pub fn record_vote(&self, voter: &str, choice: VoteChoice, hash: &str) {
        let entry = ActivityEntry {
            address: feed_address(voter),
            choice,
            timestamp: Utc::now(),
            hash: hash.to_string(),
            is_new: true,
        };

        let mut inner = self.inner.lock().expect("poll store lock poisoned");
        match choice {
            VoteChoice::Yes => inner.tallies.yes += 1,
            VoteChoice::No => inner.tallies.no += 1,
        }
        for old in inner.feed.iter_mut() {
            old.is_new = false;
        }
        inner.feed.insert(0, entry);
        inner.feed.truncate(FEED_CAP);
    }

    /// Current tallies (snapshot copy).
    pub fn tallies(&self) -> Tallies {
        self.inner.lock().expect("poll store lock poisoned").tallies
    }

    /// Current feed, newest first (snapshot copy).
    pub fn feed(&self) -> Vec<ActivityEntry> {
        self.inner
            .lock()
            .expect("poll store lock poisoned")
            .feed
            .clone()
    }
}

impl Default for PollStore {
    fn default() -> Self {
        Self::seeded()
    }
}
