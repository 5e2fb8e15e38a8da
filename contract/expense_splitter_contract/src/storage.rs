use soroban_sdk::{contracterror, contracttype, Address, Env};

use crate::balance::Balance;

/// Group size cap, inherited from the settlement batch limit.
pub const MAX_MEMBERS: u32 = 16;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Creator,
    MemberCount,
    ExpenseCount,
    Settled,
    TotalPool,
    Member(Address),
    MemberAddr(u32), // slot index -> member, for expense fan-out
    Expense(u64),
}

#[contracttype]
#[derive(Clone)]
pub struct MemberState {
    pub balance: Balance,
    pub active: bool,
}

/// Append-only record of one expense, kept for transparency.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expense {
    pub payer: Address,
    pub amount: i128,
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
    AlreadyDone = 6,
}

pub fn get_creator(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Creator)
        .ok_or(Error::NotFound)
}

pub fn get_member(env: &Env, who: &Address) -> Result<MemberState, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Member(who.clone()))
        .ok_or(Error::NotFound)
}

pub fn put_member(env: &Env, who: &Address, state: &MemberState) {
    env.storage()
        .persistent()
        .set(&DataKey::Member(who.clone()), state);
}

pub fn member_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::MemberCount).unwrap_or(0)
}

pub fn is_settled(env: &Env) -> bool {
    env.storage().instance().get(&DataKey::Settled).unwrap_or(false)
}
