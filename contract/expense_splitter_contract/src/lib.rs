#![no_std]
use soroban_sdk::{contract, contractimpl, Address, Env, String};

mod balance;
mod storage;


use crate::balance::Balance;
use crate::storage::*;

#[contract]
pub struct ExpenseSplitterContract;

#[contractimpl]
impl ExpenseSplitterContract {
    /// Start a new split. The creator administers settlement but joins
    /// the member list like everyone else.
    pub fn initialize(env: Env, creator: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Creator) {
            return Err(Error::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Creator, &creator);
        env.storage().instance().set(&DataKey::MemberCount, &0u32);
        env.storage().instance().set(&DataKey::ExpenseCount, &0u64);
        env.storage().instance().set(&DataKey::Settled, &false);
        env.storage().instance().set(&DataKey::TotalPool, &0i128);
        Ok(())
    }

    /// Open self-registration, up to the group cap.
    pub fn join(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        if is_settled(&env) {
            return Err(Error::InvalidState);
        }
        if get_member(&env, &caller).is_ok() {
            return Err(Error::AlreadyDone);
        }
        let count = member_count(&env);
        if count >= MAX_MEMBERS {
            return Err(Error::InvariantViolation);
        }

        put_member(
            &env,
            &caller,
            &MemberState {
                balance: Balance::zero(),
                active: true,
            },
        );
        env.storage()
            .persistent()
            .set(&DataKey::MemberAddr(count), &caller);
        env.storage()
            .instance()
            .set(&DataKey::MemberCount, &(count + 1));
        Ok(())
    }

    /// Log an expense paid by the caller and distribute it over the
    /// whole group in this one call. Each member's share is the floor
    /// of `amount / member_count`; the division remainder is absorbed
    /// by the payer and never enters the ledger.
    pub fn add_expense(
        env: Env,
        caller: Address,
        amount: i128,
        _description: String,
    ) -> Result<(), Error> {
        caller.require_auth();
        if is_settled(&env) {
            return Err(Error::InvalidState);
        }
        let mut payer = get_member(&env, &caller).map_err(|_| Error::Unauthorized)?;
        if !payer.active {
            return Err(Error::Unauthorized);
        }
        if amount <= 0 {
            return Err(Error::InvariantViolation);
        }

        let count = member_count(&env);
        let share = amount / count as i128;

        payer.balance.credit(share * (count as i128 - 1));
        put_member(&env, &caller, &payer);

        for slot in 0..count {
            let addr: Address = env
                .storage()
                .persistent()
                .get(&DataKey::MemberAddr(slot))
                .ok_or(Error::NotFound)?;
            if addr == caller {
                continue;
            }
            let mut member = get_member(&env, &addr)?;
            member.balance.debit(share);
            put_member(&env, &addr, &member);
        }

        let pool: i128 = env.storage().instance().get(&DataKey::TotalPool).unwrap_or(0);
        env.storage()
            .instance()
            .set(&DataKey::TotalPool, &(pool + amount));

        let index: u64 = env
            .storage()
            .instance()
            .get(&DataKey::ExpenseCount)
            .unwrap_or(0);
        env.storage().persistent().set(
            &DataKey::Expense(index),
            &Expense {
                payer: caller,
                amount,
            },
        );
        env.storage()
            .instance()
            .set(&DataKey::ExpenseCount, &(index + 1));
        Ok(())
    }

    pub fn is_member(env: Env, who: Address) -> bool {
        match get_member(&env, &who) {
            Ok(state) => state.active,
            Err(_) => false,
        }
    }

    /// A member's net position: (magnitude, is_owed).
    pub fn get_balance(env: Env, member: Address) -> Result<(i128, bool), Error> {
        let state = get_member(&env, &member)?;
        Ok((state.balance.magnitude, state.balance.owed))
    }

    /// (member_count, expense_count, total_pool, is_settled)
    pub fn get_split_info(env: Env) -> (u32, u64, i128, bool) {
        let expense_count: u64 = env
            .storage()
            .instance()
            .get(&DataKey::ExpenseCount)
            .unwrap_or(0);
        let pool: i128 = env.storage().instance().get(&DataKey::TotalPool).unwrap_or(0);
        (member_count(&env), expense_count, pool, is_settled(&env))
    }

    pub fn get_expense(env: Env, index: u64) -> Result<Expense, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Expense(index))
            .ok_or(Error::NotFound)
    }

    /// One-way settlement flag. Creator only. Freezes the ledger and
    /// unlocks `close_out`.
    pub fn mark_settled(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        if caller != get_creator(&env)? {
            return Err(Error::Unauthorized);
        }
        if is_settled(&env) {
            return Err(Error::AlreadyDone);
        }
        env.storage().instance().set(&DataKey::Settled, &true);
        Ok(())
    }

    /// Clear the caller's ledger state after settlement.
    pub fn close_out(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        if !is_settled(&env) {
            return Err(Error::InvalidState);
        }
        let mut state = get_member(&env, &caller)?;
        if !state.active {
            return Err(Error::AlreadyDone);
        }
        state.balance = Balance::zero();
        state.active = false;
        put_member(&env, &caller, &state);
        Ok(())
    }
}
