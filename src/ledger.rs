use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::RwLock;

/// Node role. `Shutdown` is the initial value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Role {
    Leader = 0,
    Follower = 1,
    Candidate = 2,
    Shutdown = 3,
}

impl Role {
    fn from_u8(v: u8) -> Role {
        match v {
            0 => Role::Leader,
            1 => Role::Follower,
            2 => Role::Candidate,
            _ => Role::Shutdown,
        }
    }
}

/// Term and Role are read/written atomically so Control API callers never
/// block on the engine; the vote map is guarded by a read/write lock.
pub struct Ledger {
    term: AtomicU64,
    role: AtomicU8,
    votes: RwLock<HashSet<u64>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            term: AtomicU64::new(0),
            role: AtomicU8::new(Role::Shutdown as u8),
            votes: RwLock::new(HashSet::new()),
        }
    }

    pub fn term(&self) -> u64 {
        self.term.load(Ordering::SeqCst)
    }

    /// Does not validate monotonicity — the caller is responsible.
    pub fn set_term(&self, term: u64) {
        self.term.store(term, Ordering::SeqCst);
    }

    pub fn role(&self) -> Role {
        Role::from_u8(self.role.load(Ordering::SeqCst))
    }

    pub fn set_role(&self, role: Role) {
        self.role.store(role as u8, Ordering::SeqCst);
    }

    pub fn voted(&self, term: u64) -> bool {
        self.votes.read().expect("vote lock poisoned").contains(&term)
    }

    pub fn voting(&self, term: u64) {
        self.votes.write().expect("vote lock poisoned").insert(term);
    }

    /// Resets term to 0 and role to `Shutdown`. Used only by `Stop`.
    pub fn reset(&self) {
        self.term.store(0, Ordering::SeqCst);
        self.role.store(Role::Shutdown as u8, Ordering::SeqCst);
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
