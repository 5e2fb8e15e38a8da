#![no_std]

#[cfg(test)]
mod test;

mod events;
mod storage_types;

use events::{
    CampaignCreatedEvent, CampaignFinalizedEvent, DonationReceivedEvent, MilestoneReleasedEvent,
    RefundClaimedEvent,
};
use storage_types::{
    Campaign, CampaignId, CampaignStatus, DataKey, Donation, Error, Milestone, MilestoneIndex,
    PersistentKey, MIN_RESERVE, TTL_INSTANCE, TTL_PERSISTENT,
};

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, String};

#[contract]
pub struct FundraisingContract;

#[contractimpl]
impl FundraisingContract {
    /// Bind the escrow to the token it custodies.
    pub fn initialize(e: Env, token: Address) -> Result<(), Error> {
        if e.storage().instance().has(&DataKey::Token) {
            return Err(Error::AlreadyInitialized);
        }
        e.storage().instance().set(&DataKey::Token, &token);
        e.storage().instance().set(&DataKey::CampaignCount, &0u64);
        extend_instance(&e);
        Ok(())
    }

    /// Open a campaign. Any caller may create one; the deadline has to
    /// lie in the future at creation time.
    pub fn create_campaign(
        e: Env,
        creator: Address,
        beneficiary: Address,
        goal: i128,
        deadline: u64,
        title: String,
        description: String,
    ) -> Result<CampaignId, Error> {
        creator.require_auth();
        if goal <= 0 {
            return Err(Error::InvariantViolation);
        }
        if deadline <= e.ledger().timestamp() {
            return Err(Error::InvariantViolation);
        }

        let campaign_id: u64 = e
            .storage()
            .instance()
            .get(&DataKey::CampaignCount)
            .unwrap_or(0);
        let campaign = Campaign {
            id: campaign_id,
            creator: creator.clone(),
            beneficiary,
            goal,
            raised: 0,
            deadline,
            status: CampaignStatus::Active,
            milestone_count: 0,
            donation_count: 0,
            title,
            description,
        };
        put_campaign(&e, &campaign);
        e.storage()
            .instance()
            .set(&DataKey::CampaignCount, &(campaign_id + 1));
        extend_instance(&e);

        e.events().publish(
            (symbol_short!("campaign"), symbol_short!("created")),
            CampaignCreatedEvent {
                campaign_id,
                creator,
                goal,
                deadline,
            },
        );
        Ok(campaign_id)
    }

    /// Attach a milestone to an active campaign. Creator only.
    pub fn add_milestone(
        e: Env,
        caller: Address,
        campaign_id: CampaignId,
        description: String,
        amount: i128,
    ) -> Result<MilestoneIndex, Error> {
        caller.require_auth();
        let mut campaign = get_campaign(&e, campaign_id)?;
        if caller != campaign.creator {
            return Err(Error::Unauthorized);
        }
        if campaign.status != CampaignStatus::Active {
            return Err(Error::InvalidState);
        }
        if amount <= 0 {
            return Err(Error::InvariantViolation);
        }

        let index = campaign.milestone_count;
        let milestone = Milestone {
            amount,
            released: 0,
            completed: false,
            description,
        };
        put_milestone(&e, campaign_id, index, &milestone);

        campaign.milestone_count += 1;
        put_campaign(&e, &campaign);
        Ok(index)
    }

    /// Donate to an active campaign before its deadline. The anonymous
    /// flag only blanks the donor field in the transparency record;
    /// the refund accumulator always tracks the true sender.
    pub fn donate(
        e: Env,
        donor: Address,
        campaign_id: CampaignId,
        amount: i128,
        anonymous: bool,
    ) -> Result<(), Error> {
        donor.require_auth();
        let mut campaign = get_campaign(&e, campaign_id)?;
        if campaign.status != CampaignStatus::Active {
            return Err(Error::InvalidState);
        }
        if e.ledger().timestamp() >= campaign.deadline {
            return Err(Error::InvalidState);
        }
        if amount <= 0 {
            return Err(Error::InvariantViolation);
        }

        let client = token_client(&e)?;
        if client
            .try_transfer(&donor, &e.current_contract_address(), &amount)
            .is_err()
        {
            return Err(Error::InsufficientFunds);
        }

        let record = Donation {
            donor: if anonymous { None } else { Some(donor.clone()) },
            amount,
            timestamp: e.ledger().timestamp(),
        };
        let donation_index = campaign.donation_count;
        e.storage().persistent().set(
            &PersistentKey::Donation(campaign_id, donation_index),
            &record,
        );

        let donor_key = PersistentKey::DonorTotal(campaign_id, donor);
        let total: i128 = e.storage().persistent().get(&donor_key).unwrap_or(0);
        e.storage().persistent().set(&donor_key, &(total + amount));
        extend_persistent(&e, &donor_key);

        campaign.raised += amount;
        campaign.donation_count += 1;
        put_campaign(&e, &campaign);

        e.events().publish(
            (symbol_short!("campaign"), symbol_short!("donated")),
            DonationReceivedEvent {
                campaign_id,
                amount,
                raised: campaign.raised,
            },
        );
        Ok(())
    }

    /// Mark a milestone complete. Creator only, irreversible.
    pub fn complete_milestone(
        e: Env,
        caller: Address,
        campaign_id: CampaignId,
        milestone_index: MilestoneIndex,
    ) -> Result<(), Error> {
        caller.require_auth();
        let campaign = get_campaign(&e, campaign_id)?;
        if caller != campaign.creator {
            return Err(Error::Unauthorized);
        }
        let mut milestone = get_milestone(&e, campaign_id, milestone_index)?;
        if milestone.completed {
            return Err(Error::AlreadyDone);
        }
        milestone.completed = true;
        put_milestone(&e, campaign_id, milestone_index, &milestone);
        Ok(())
    }

    /// Pay out a completed milestone to the beneficiary. Anyone may
    /// trigger the release; it happens at most once per milestone.
    pub fn release_funds(
        e: Env,
        caller: Address,
        campaign_id: CampaignId,
        milestone_index: MilestoneIndex,
    ) -> Result<(), Error> {
        caller.require_auth();
        let campaign = get_campaign(&e, campaign_id)?;
        let mut milestone = get_milestone(&e, campaign_id, milestone_index)?;
        if !milestone.completed {
            return Err(Error::InvalidState);
        }
        if milestone.released != 0 {
            return Err(Error::AlreadyDone);
        }
        if milestone.amount > available_balance(&e) {
            return Err(Error::InsufficientFunds);
        }

        let client = token_client(&e)?;
        if client
            .try_transfer(
                &e.current_contract_address(),
                &campaign.beneficiary,
                &milestone.amount,
            )
            .is_err()
        {
            return Err(Error::InsufficientFunds);
        }

        milestone.released = milestone.amount;
        put_milestone(&e, campaign_id, milestone_index, &milestone);

        e.events().publish(
            (symbol_short!("milestone"), symbol_short!("released")),
            MilestoneReleasedEvent {
                campaign_id,
                milestone_index,
                amount: milestone.amount,
            },
        );
        Ok(())
    }

    /// Settle an active campaign once its deadline has passed:
    /// Successful if the goal was raised, Failed otherwise.
    pub fn finalize_campaign(e: Env, campaign_id: CampaignId) -> Result<(), Error> {
        let mut campaign = get_campaign(&e, campaign_id)?;
        if campaign.status != CampaignStatus::Active {
            return Err(Error::InvalidState);
        }
        if e.ledger().timestamp() < campaign.deadline {
            return Err(Error::InvalidState);
        }

        campaign.status = if campaign.raised >= campaign.goal {
            CampaignStatus::Successful
        } else {
            CampaignStatus::Failed
        };
        put_campaign(&e, &campaign);

        e.events().publish(
            (symbol_short!("campaign"), symbol_short!("final")),
            CampaignFinalizedEvent {
                campaign_id,
                successful: campaign.status == CampaignStatus::Successful,
                raised: campaign.raised,
            },
        );
        Ok(())
    }

    /// Abort an active campaign. Creator only. Records the campaign as
    /// failed so donors become refund-eligible.
    pub fn cancel_campaign(e: Env, caller: Address, campaign_id: CampaignId) -> Result<(), Error> {
        caller.require_auth();
        let mut campaign = get_campaign(&e, campaign_id)?;
        if caller != campaign.creator {
            return Err(Error::Unauthorized);
        }
        if campaign.status != CampaignStatus::Active {
            return Err(Error::InvalidState);
        }
        campaign.status = CampaignStatus::Failed;
        put_campaign(&e, &campaign);
        Ok(())
    }

    /// Return a donor's cumulative donation after a campaign failed.
    /// Claimable exactly once; the accumulator is zeroed on payout.
    pub fn claim_refund(e: Env, caller: Address, campaign_id: CampaignId) -> Result<i128, Error> {
        caller.require_auth();
        let campaign = get_campaign(&e, campaign_id)?;
        if campaign.status != CampaignStatus::Failed {
            return Err(Error::InvalidState);
        }

        let donor_key = PersistentKey::DonorTotal(campaign_id, caller.clone());
        let refund: i128 = e
            .storage()
            .persistent()
            .get(&donor_key)
            .ok_or(Error::NotFound)?;
        if refund == 0 {
            return Err(Error::AlreadyDone);
        }
        if refund > available_balance(&e) {
            return Err(Error::InsufficientFunds);
        }

        let client = token_client(&e)?;
        if client
            .try_transfer(&e.current_contract_address(), &caller, &refund)
            .is_err()
        {
            return Err(Error::InsufficientFunds);
        }

        e.storage().persistent().set(&donor_key, &0i128);

        e.events().publish(
            (symbol_short!("campaign"), symbol_short!("refund")),
            RefundClaimedEvent {
                campaign_id,
                donor: caller,
                amount: refund,
            },
        );
        Ok(refund)
    }

    /// View functions
    pub fn get_campaign(e: Env, campaign_id: CampaignId) -> Result<Campaign, Error> {
        get_campaign(&e, campaign_id)
    }

    pub fn get_milestone(
        e: Env,
        campaign_id: CampaignId,
        milestone_index: MilestoneIndex,
    ) -> Result<Milestone, Error> {
        get_milestone(&e, campaign_id, milestone_index)
    }

    pub fn get_donation(
        e: Env,
        campaign_id: CampaignId,
        donation_index: u32,
    ) -> Result<Donation, Error> {
        e.storage()
            .persistent()
            .get(&PersistentKey::Donation(campaign_id, donation_index))
            .ok_or(Error::NotFound)
    }

    /// Cumulative donation by one principal; 0 before the first gift.
    pub fn get_donation_total(e: Env, campaign_id: CampaignId, donor: Address) -> i128 {
        e.storage()
            .persistent()
            .get(&PersistentKey::DonorTotal(campaign_id, donor))
            .unwrap_or(0)
    }

    pub fn get_campaign_count(e: Env) -> u64 {
        e.storage()
            .instance()
            .get(&DataKey::CampaignCount)
            .unwrap_or(0)
    }
}

// Helper functions
fn extend_instance(e: &Env) {
    e.storage().instance().extend_ttl(TTL_INSTANCE, TTL_INSTANCE);
}

fn extend_persistent(e: &Env, key: &PersistentKey) {
    e.storage()
        .persistent()
        .extend_ttl(key, TTL_PERSISTENT, TTL_PERSISTENT);
}

fn token_client(e: &Env) -> Result<token::Client<'_>, Error> {
    let token_addr: Address = e
        .storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotFound)?;
    Ok(token::Client::new(e, &token_addr))
}

fn available_balance(e: &Env) -> i128 {
    let client = match token_client(e) {
        Ok(client) => client,
        Err(_) => return 0,
    };
    let balance = client.balance(&e.current_contract_address());
    if balance > MIN_RESERVE {
        balance - MIN_RESERVE
    } else {
        0
    }
}

fn get_campaign(e: &Env, campaign_id: u64) -> Result<Campaign, Error> {
    e.storage()
        .persistent()
        .get(&PersistentKey::Campaign(campaign_id))
        .ok_or(Error::NotFound)
}

fn put_campaign(e: &Env, campaign: &Campaign) {
    let key = PersistentKey::Campaign(campaign.id);
    e.storage().persistent().set(&key, campaign);
    extend_persistent(e, &key);
}

fn get_milestone(e: &Env, campaign_id: u64, index: u32) -> Result<Milestone, Error> {
    e.storage()
        .persistent()
        .get(&PersistentKey::Milestone(campaign_id, index))
        .ok_or(Error::NotFound)
}

fn put_milestone(e: &Env, campaign_id: u64, index: u32, milestone: &Milestone) {
    let key = PersistentKey::Milestone(campaign_id, index);
    e.storage().persistent().set(&key, milestone);
    extend_persistent(e, &key);
}
