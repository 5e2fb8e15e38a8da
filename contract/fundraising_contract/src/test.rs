#![cfg(test)]
use super::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::token;
use soroban_sdk::{Address, Env, String};

const START: u64 = 1_700_000_000;
const DEADLINE: u64 = START + 86_400;

struct Fixture<'a> {
    env: Env,
    client: FundraisingContractClient<'a>,
    token_addr: Address,
    sac: token::StellarAssetClient<'a>,
}

fn setup() -> Fixture<'static> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| {
        li.timestamp = START;
    });

    let token_admin = Address::generate(&env);
    let sac_contract = env.register_stellar_asset_contract_v2(token_admin.clone());
    let token_addr = sac_contract.address();
    let sac = token::StellarAssetClient::new(&env, &token_addr);

    let contract_id = env.register(FundraisingContract, ());
    let client = FundraisingContractClient::new(&env, &contract_id);
    client.initialize(&token_addr);

    Fixture {
        env,
        client,
        token_addr,
        sac,
    }
}

impl Fixture<'_> {
    fn new_campaign(&self, creator: &Address, goal: i128) -> u64 {
        self.client.create_campaign(
            creator,
            &Address::generate(&self.env),
            &goal,
            &DEADLINE,
            &String::from_str(&self.env, "Robotics club"),
            &String::from_str(&self.env, "Parts for the spring build"),
        )
    }

    fn funded_donor(&self, amount: i128) -> Address {
        let donor = Address::generate(&self.env);
        self.sac.mint(&donor, &amount);
        donor
    }

    fn past_deadline(&self) {
        self.env.ledger().with_mut(|li| {
            li.timestamp = DEADLINE;
        });
    }
}

#[test]
fn test_campaign_lifecycle_successful() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);
    assert_eq!(campaign_id, 0);
    assert_eq!(f.client.get_campaign_count(), 1);

    let donor1 = f.funded_donor(8_000_000);
    let donor2 = f.funded_donor(4_000_000);
    f.client.donate(&donor1, &campaign_id, &8_000_000, &false);
    f.client.donate(&donor2, &campaign_id, &4_000_000, &false);

    let campaign = f.client.get_campaign(&campaign_id);
    assert_eq!(campaign.raised, 12_000_000);
    assert_eq!(campaign.donation_count, 2);
    assert_eq!(campaign.status, CampaignStatus::Active);

    f.past_deadline();
    f.client.finalize_campaign(&campaign_id);
    let campaign = f.client.get_campaign(&campaign_id);
    assert_eq!(campaign.status, CampaignStatus::Successful);

    // Terminal: a second finalize or a cancel must fail.
    assert_eq!(
        f.client.try_finalize_campaign(&campaign_id),
        Err(Ok(Error::InvalidState))
    );
    assert_eq!(
        f.client.try_cancel_campaign(&creator, &campaign_id),
        Err(Ok(Error::InvalidState))
    );

    // Refunds only apply to failed campaigns.
    assert_eq!(
        f.client.try_claim_refund(&donor1, &campaign_id),
        Err(Ok(Error::InvalidState))
    );
}

#[test]
fn test_milestone_release_flow() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);

    let donor = f.funded_donor(10_000_000);
    f.client.donate(&donor, &campaign_id, &10_000_000, &false);

    let index = f.client.add_milestone(
        &creator,
        &campaign_id,
        &String::from_str(&f.env, "Chassis built"),
        &4_000_000,
    );
    assert_eq!(index, 0);

    // Release requires completion first.
    let anyone = Address::generate(&f.env);
    assert_eq!(
        f.client.try_release_funds(&anyone, &campaign_id, &index),
        Err(Ok(Error::InvalidState))
    );

    let outsider = Address::generate(&f.env);
    assert_eq!(
        f.client.try_complete_milestone(&outsider, &campaign_id, &index),
        Err(Ok(Error::Unauthorized))
    );

    f.client.complete_milestone(&creator, &campaign_id, &index);
    assert_eq!(
        f.client.try_complete_milestone(&creator, &campaign_id, &index),
        Err(Ok(Error::AlreadyDone))
    );

    f.client.release_funds(&anyone, &campaign_id, &index);
    let milestone = f.client.get_milestone(&campaign_id, &index);
    assert!(milestone.completed);
    assert_eq!(milestone.released, 4_000_000);

    let campaign = f.client.get_campaign(&campaign_id);
    let token_balance = token::Client::new(&f.env, &f.token_addr);
    assert_eq!(token_balance.balance(&campaign.beneficiary), 4_000_000);

    // Double release is rejected.
    assert_eq!(
        f.client.try_release_funds(&anyone, &campaign_id, &index),
        Err(Ok(Error::AlreadyDone))
    );
}

#[test]
fn test_milestone_release_bounded_by_reserve() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);

    let donor = f.funded_donor(10_000_000);
    f.client.donate(&donor, &campaign_id, &10_000_000, &false);

    // 10_000_000 in custody leaves 9_000_000 spendable.
    let index = f.client.add_milestone(
        &creator,
        &campaign_id,
        &String::from_str(&f.env, "Everything at once"),
        &9_500_000,
    );
    f.client.complete_milestone(&creator, &campaign_id, &index);
    assert_eq!(
        f.client.try_release_funds(&creator, &campaign_id, &index),
        Err(Ok(Error::InsufficientFunds))
    );
    assert_eq!(f.client.get_milestone(&campaign_id, &index).released, 0);
}

#[test]
fn test_anonymous_donation_accounting() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);

    let donor = f.funded_donor(5_000_000);
    f.client.donate(&donor, &campaign_id, &2_000_000, &true);
    f.client.donate(&donor, &campaign_id, &1_000_000, &false);

    // The transparency log hides the donor only when asked to.
    let first = f.client.get_donation(&campaign_id, &0);
    assert_eq!(first.donor, None);
    assert_eq!(first.amount, 2_000_000);
    assert_eq!(first.timestamp, START);
    let second = f.client.get_donation(&campaign_id, &1);
    assert_eq!(second.donor, Some(donor.clone()));

    // Raised and the refund accumulator track the true sender anyway.
    let campaign = f.client.get_campaign(&campaign_id);
    assert_eq!(campaign.raised, 3_000_000);
    assert_eq!(campaign.donation_count, 2);
    assert_eq!(f.client.get_donation_total(&campaign_id, &donor), 3_000_000);
}

#[test]
fn test_donation_gates() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);
    let donor = f.funded_donor(5_000_000);

    assert_eq!(
        f.client.try_donate(&donor, &99, &1_000_000, &false),
        Err(Ok(Error::NotFound))
    );
    assert_eq!(
        f.client.try_donate(&donor, &campaign_id, &0, &false),
        Err(Ok(Error::InvariantViolation))
    );

    // A donor without the funds cannot donate.
    let broke = Address::generate(&f.env);
    assert_eq!(
        f.client.try_donate(&broke, &campaign_id, &1_000_000, &false),
        Err(Ok(Error::InsufficientFunds))
    );

    f.past_deadline();
    assert_eq!(
        f.client.try_donate(&donor, &campaign_id, &1_000_000, &false),
        Err(Ok(Error::InvalidState))
    );
}

#[test]
fn test_refund_claimed_exactly_once() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 50_000_000);

    let donor = f.funded_donor(5_000_000);
    let other = f.funded_donor(3_000_000);
    f.client.donate(&donor, &campaign_id, &2_000_000, &false);
    f.client.donate(&donor, &campaign_id, &3_000_000, &true);
    f.client.donate(&other, &campaign_id, &3_000_000, &false);

    // Refunds unlock only after the campaign is recorded as failed.
    assert_eq!(
        f.client.try_claim_refund(&donor, &campaign_id),
        Err(Ok(Error::InvalidState))
    );

    f.past_deadline();
    f.client.finalize_campaign(&campaign_id);
    assert_eq!(
        f.client.get_campaign(&campaign_id).status,
        CampaignStatus::Failed
    );

    // Exact cumulative donation, anonymous gifts included.
    let refund = f.client.claim_refund(&donor, &campaign_id);
    assert_eq!(refund, 5_000_000);
    let token_balance = token::Client::new(&f.env, &f.token_addr);
    assert_eq!(token_balance.balance(&donor), 5_000_000);

    assert_eq!(
        f.client.try_claim_refund(&donor, &campaign_id),
        Err(Ok(Error::AlreadyDone))
    );
    assert_eq!(f.client.get_donation_total(&campaign_id, &donor), 0);

    // A principal who never donated has nothing on record.
    let stranger = Address::generate(&f.env);
    assert_eq!(
        f.client.try_claim_refund(&stranger, &campaign_id),
        Err(Ok(Error::NotFound))
    );

    // The reserve keeps the final refund short of its full amount.
    assert_eq!(
        f.client.try_claim_refund(&other, &campaign_id),
        Err(Ok(Error::InsufficientFunds))
    );
}

#[test]
fn test_cancel_unlocks_refunds_before_deadline() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 50_000_000);

    let donor = f.funded_donor(8_000_000);
    f.client.donate(&donor, &campaign_id, &8_000_000, &false);

    let outsider = Address::generate(&f.env);
    assert_eq!(
        f.client.try_cancel_campaign(&outsider, &campaign_id),
        Err(Ok(Error::Unauthorized))
    );

    f.client.cancel_campaign(&creator, &campaign_id);
    let campaign = f.client.get_campaign(&campaign_id);
    assert_eq!(campaign.status, CampaignStatus::Failed);

    // No further donations or milestones once cancelled.
    assert_eq!(
        f.client.try_donate(&donor, &campaign_id, &1, &false),
        Err(Ok(Error::InvalidState))
    );
    assert_eq!(
        f.client.try_add_milestone(
            &creator,
            &campaign_id,
            &String::from_str(&f.env, "late"),
            &1_000_000,
        ),
        Err(Ok(Error::InvalidState))
    );

    let refund = f.client.claim_refund(&donor, &campaign_id);
    assert_eq!(refund, 8_000_000);
}

#[test]
fn test_campaign_creation_guards() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let beneficiary = Address::generate(&f.env);

    assert_eq!(
        f.client.try_create_campaign(
            &creator,
            &beneficiary,
            &0,
            &DEADLINE,
            &String::from_str(&f.env, "t"),
            &String::from_str(&f.env, "d"),
        ),
        Err(Ok(Error::InvariantViolation))
    );
    assert_eq!(
        f.client.try_create_campaign(
            &creator,
            &beneficiary,
            &1_000_000,
            &START,
            &String::from_str(&f.env, "t"),
            &String::from_str(&f.env, "d"),
        ),
        Err(Ok(Error::InvariantViolation))
    );

    // Finalize waits for the deadline.
    let campaign_id = f.new_campaign(&creator, 1_000_000);
    assert_eq!(
        f.client.try_finalize_campaign(&campaign_id),
        Err(Ok(Error::InvalidState))
    );
}

#[test]
fn test_reads_do_not_mutate() {
    let f = setup();
    let creator = Address::generate(&f.env);
    let campaign_id = f.new_campaign(&creator, 10_000_000);
    let donor = f.funded_donor(2_000_000);
    f.client.donate(&donor, &campaign_id, &2_000_000, &false);

    let before = f.client.get_campaign(&campaign_id);
    let again = f.client.get_campaign(&campaign_id);
    assert_eq!(before.raised, again.raised);
    assert_eq!(before.donation_count, again.donation_count);
    assert_eq!(
        f.client.get_donation_total(&campaign_id, &donor),
        f.client.get_donation_total(&campaign_id, &donor)
    );
    assert_eq!(
        f.client.try_get_milestone(&campaign_id, &0),
        Err(Ok(Error::NotFound))
    );
}

#[test]
fn test_double_initialize_rejected() {
    let f = setup();
    assert_eq!(
        f.client.try_initialize(&f.token_addr),
        Err(Ok(Error::AlreadyInitialized))
    );
}
