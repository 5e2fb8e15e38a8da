use soroban_sdk::{contracterror, contracttype, Address, String};

// Storage keys for instance data
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Token,
    CampaignCount,
}

// Storage keys for persistent data
#[derive(Clone)]
#[contracttype]
pub enum PersistentKey {
    Campaign(u64),
    Milestone(u64, u32),
    Donation(u64, u32),
    DonorTotal(u64, Address),
}

pub type CampaignId = u64;
pub type MilestoneIndex = u32;

// Campaign status; transitions only move forward and terminal states
// never reopen. Cancellation records the campaign as Failed so that
// donors become refund-eligible.
#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub enum CampaignStatus {
    Active,
    Successful,
    Failed,
    Cancelled,
}

#[derive(Clone)]
#[contracttype]
pub struct Campaign {
    pub id: CampaignId,
    pub creator: Address,
    pub beneficiary: Address,
    pub goal: i128,
    pub raised: i128,
    pub deadline: u64,
    pub status: CampaignStatus,
    pub milestone_count: u32,
    pub donation_count: u32,
    pub title: String,
    pub description: String,
}

// `released` is 0 until release, then exactly `amount`; both it and
// `completed` are set once.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Milestone {
    pub amount: i128,
    pub released: i128,
    pub completed: bool,
    pub description: String,
}

// Transparency-log entry. `donor = None` is the anonymous tag; refund
// accounting is always keyed by the true sender elsewhere.
#[derive(Clone)]
#[contracttype]
pub struct Donation {
    pub donor: Option<Address>,
    pub amount: i128,
    pub timestamp: u64,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    Unauthorized = 2,
    NotFound = 3,
    InvalidState = 4,
    InvariantViolation = 5,
    InsufficientFunds = 6,
    AlreadyDone = 7,
}

// Escrow floor that stays behind for rent, in token units.
pub const MIN_RESERVE: i128 = 1_000_000;
pub const TTL_INSTANCE: u32 = 17280 * 30; // 30 days
pub const TTL_PERSISTENT: u32 = 17280 * 90; // 90 days
