use soroban_sdk::{contracterror, contracttype, Address, Env, String, Vec};

/// Maximum signers in the treasury (N in M-of-N).
pub const MAX_SIGNERS: u32 = 10;

/// Custody floor that can never be paid out, in token units.
pub const MIN_RESERVE: i128 = 1_000_000;

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Admin,
    Token,
    Threshold,
    SignerCount,
    ProposalCount,
    Signer(Address),
    Proposal(u64),
    Votes(u64),          // ProposalID -> transparency log of approvers
    Voted(u64, Address), // (ProposalID, Signer) -> duplicate-vote guard
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum ProposalStatus {
    Pending,
    Executed,
    Rejected,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Proposal {
    pub id: u64,
    pub creator: Address,
    pub recipient: Address,
    pub amount: i128,
    pub description: String,
    pub status: ProposalStatus,
    pub approvals: u32,
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

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotFound)
}

pub fn get_threshold(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::Threshold).unwrap_or(0)
}

pub fn get_signer_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::SignerCount).unwrap_or(0)
}

pub fn is_signer(env: &Env, who: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Signer(who.clone()))
        .unwrap_or(false)
}

pub fn get_proposal(env: &Env, id: u64) -> Result<Proposal, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(id))
        .ok_or(Error::NotFound)
}

pub fn put_proposal(env: &Env, proposal: &Proposal) {
    env.storage()
        .persistent()
        .set(&DataKey::Proposal(proposal.id), proposal);
}

pub fn get_votes(env: &Env, id: u64) -> Result<Vec<Address>, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Votes(id))
        .ok_or(Error::NotFound)
}
