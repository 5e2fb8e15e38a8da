#![no_std]

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, String, Vec};

mod storage;
use storage::*;

#[contract]
pub struct TreasuryContract;

#[contractimpl]
impl TreasuryContract {
    /// Set up the treasury with its creator, the custody token and the
    /// M-of-N approval threshold. Signers are added afterwards.
    pub fn initialize(
        env: Env,
        creator: Address,
        token: Address,
        threshold: u32,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        if threshold == 0 {
            return Err(Error::InvariantViolation);
        }
        env.storage().instance().set(&DataKey::Admin, &creator);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::Threshold, &threshold);
        env.storage().instance().set(&DataKey::SignerCount, &0u32);
        env.storage().instance().set(&DataKey::ProposalCount, &0u64);
        Ok(())
    }

    /// Register a new signer. Creator only. The threshold invariant is
    /// re-checked after the addition, so a treasury created with a
    /// threshold above one cannot add its first signer until the
    /// threshold is lowered.
    pub fn add_signer(env: Env, caller: Address, signer: Address) -> Result<(), Error> {
        caller.require_auth();
        if caller != get_admin(&env)? {
            return Err(Error::Unauthorized);
        }
        if is_signer(&env, &signer) {
            return Err(Error::AlreadyDone);
        }
        let count = get_signer_count(&env);
        if count >= MAX_SIGNERS {
            return Err(Error::InvariantViolation);
        }
        let new_count = count + 1;
        if get_threshold(&env) > new_count {
            return Err(Error::InvariantViolation);
        }
        env.storage().persistent().set(&DataKey::Signer(signer), &true);
        env.storage().instance().set(&DataKey::SignerCount, &new_count);
        Ok(())
    }

    /// Remove a signer. Creator only. Fails if the remaining signers
    /// would no longer satisfy the threshold.
    pub fn remove_signer(env: Env, caller: Address, signer: Address) -> Result<(), Error> {
        caller.require_auth();
        if caller != get_admin(&env)? {
            return Err(Error::Unauthorized);
        }
        if !is_signer(&env, &signer) {
            return Err(Error::NotFound);
        }
        let new_count = get_signer_count(&env) - 1;
        if new_count < get_threshold(&env) {
            return Err(Error::InvariantViolation);
        }
        env.storage().persistent().set(&DataKey::Signer(signer), &false);
        env.storage().instance().set(&DataKey::SignerCount, &new_count);
        Ok(())
    }

    /// Voluntary exit by a signer, subject to the same threshold check
    /// as `remove_signer`.
    pub fn leave(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        if !is_signer(&env, &caller) {
            return Err(Error::NotFound);
        }
        let new_count = get_signer_count(&env) - 1;
        if new_count < get_threshold(&env) {
            return Err(Error::InvariantViolation);
        }
        env.storage().persistent().set(&DataKey::Signer(caller), &false);
        env.storage().instance().set(&DataKey::SignerCount, &new_count);
        Ok(())
    }

    /// Change the approval threshold. Creator only. The new value must
    /// stay within the current signer count.
    pub fn update_threshold(env: Env, caller: Address, new_threshold: u32) -> Result<(), Error> {
        caller.require_auth();
        if caller != get_admin(&env)? {
            return Err(Error::Unauthorized);
        }
        if new_threshold == 0 || new_threshold > get_signer_count(&env) {
            return Err(Error::InvariantViolation);
        }
        env.storage().instance().set(&DataKey::Threshold, &new_threshold);
        Ok(())
    }

    /// Move funds into custody.
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        from.require_auth();
        if amount <= 0 {
            return Err(Error::InvariantViolation);
        }
        let token_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotFound)?;
        let client = token::Client::new(&env, &token_addr);
        if client
            .try_transfer(&from, &env.current_contract_address(), &amount)
            .is_err()
        {
            return Err(Error::InsufficientFunds);
        }
        env.events()
            .publish((symbol_short!("deposit"), from), amount);
        Ok(())
    }

    /// Create a spending proposal. Signers only. The amount is checked
    /// against the custody balance available at creation time; the
    /// balance is not re-checked before execution.
    pub fn create_proposal(
        env: Env,
        caller: Address,
        recipient: Address,
        amount: i128,
        description: String,
    ) -> Result<u64, Error> {
        caller.require_auth();
        if !is_signer(&env, &caller) {
            return Err(Error::Unauthorized);
        }
        if amount <= 0 {
            return Err(Error::InvariantViolation);
        }
        if amount > available_balance(&env) {
            return Err(Error::InsufficientFunds);
        }

        let id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::ProposalCount)
            .unwrap_or(0);
        let proposal = Proposal {
            id,
            creator: caller,
            recipient,
            amount,
            description,
            status: ProposalStatus::Pending,
            approvals: 0,
        };
        put_proposal(&env, &proposal);
        env.storage()
            .persistent()
            .set(&DataKey::Votes(id), &Vec::<Address>::new(&env));
        env.storage().instance().set(&DataKey::ProposalCount, &(id + 1));
        Ok(id)
    }

    /// Approve a pending proposal. Signers only, once per signer.
    pub fn approve(env: Env, caller: Address, proposal_id: u64) -> Result<(), Error> {
        caller.require_auth();
        if !is_signer(&env, &caller) {
            return Err(Error::Unauthorized);
        }
        let mut proposal = get_proposal(&env, proposal_id)?;
        if proposal.status != ProposalStatus::Pending {
            return Err(Error::InvalidState);
        }
        if env
            .storage()
            .persistent()
            .has(&DataKey::Voted(proposal_id, caller.clone()))
        {
            return Err(Error::AlreadyDone);
        }

        let mut votes = get_votes(&env, proposal_id)?;
        votes.push_back(caller.clone());
        env.storage().persistent().set(&DataKey::Votes(proposal_id), &votes);
        env.storage()
            .persistent()
            .set(&DataKey::Voted(proposal_id, caller), &true);

        proposal.approvals += 1;
        put_proposal(&env, &proposal);
        Ok(())
    }

    /// Release the proposed amount to the recipient once the approval
    /// count satisfies the threshold in force right now, which may
    /// differ from the threshold when the votes were cast. A failed
    /// transfer aborts the call and leaves the proposal pending.
    pub fn execute(env: Env, caller: Address, proposal_id: u64) -> Result<(), Error> {
        caller.require_auth();
        if !is_signer(&env, &caller) {
            return Err(Error::Unauthorized);
        }
        let mut proposal = get_proposal(&env, proposal_id)?;
        if proposal.status != ProposalStatus::Pending {
            return Err(Error::InvalidState);
        }
        if proposal.approvals < get_threshold(&env) {
            return Err(Error::InvariantViolation);
        }

        let token_addr: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotFound)?;
        let client = token::Client::new(&env, &token_addr);
        if client
            .try_transfer(
                &env.current_contract_address(),
                &proposal.recipient,
                &proposal.amount,
            )
            .is_err()
        {
            return Err(Error::InsufficientFunds);
        }

        proposal.status = ProposalStatus::Executed;
        put_proposal(&env, &proposal);
        env.events()
            .publish((symbol_short!("execute"), proposal_id), proposal.amount);
        Ok(())
    }

    /// Withdraw a pending proposal. Only its creator may reject.
    pub fn reject(env: Env, caller: Address, proposal_id: u64) -> Result<(), Error> {
        caller.require_auth();
        let mut proposal = get_proposal(&env, proposal_id)?;
        if caller != proposal.creator {
            return Err(Error::Unauthorized);
        }
        if proposal.status != ProposalStatus::Pending {
            return Err(Error::InvalidState);
        }
        proposal.status = ProposalStatus::Rejected;
        put_proposal(&env, &proposal);
        Ok(())
    }

    pub fn get_proposal(env: Env, proposal_id: u64) -> Result<Proposal, Error> {
        get_proposal(&env, proposal_id)
    }

    /// Transparency log of every approval cast on a proposal.
    pub fn get_votes(env: Env, proposal_id: u64) -> Result<Vec<Address>, Error> {
        get_votes(&env, proposal_id)
    }

    pub fn is_signer(env: Env, who: Address) -> bool {
        is_signer(&env, &who)
    }

    /// (threshold, signer_count, proposal_count, available_balance)
    pub fn get_treasury_info(env: Env) -> (u32, u32, u64, i128) {
        let proposal_count: u64 = env
            .storage()
            .instance()
            .get(&DataKey::ProposalCount)
            .unwrap_or(0);
        (
            get_threshold(&env),
            get_signer_count(&env),
            proposal_count,
            available_balance(&env),
        )
    }
}

// Custody minus the protocol reserve; what proposals may spend.
fn available_balance(env: &Env) -> i128 {
    let token_addr: Address = match env.storage().instance().get(&DataKey::Token) {
        Some(addr) => addr,
        None => return 0,
    };
    let balance = token::Client::new(env, &token_addr).balance(&env.current_contract_address());
    if balance > MIN_RESERVE {
        balance - MIN_RESERVE
    } else {
        0
    }
}
