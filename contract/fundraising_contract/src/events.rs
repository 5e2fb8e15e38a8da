use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone)]
pub struct CampaignCreatedEvent {
    pub campaign_id: u64,
    pub creator: Address,
    pub goal: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone)]
pub struct DonationReceivedEvent {
    pub campaign_id: u64,
    pub amount: i128,
    pub raised: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct CampaignFinalizedEvent {
    pub campaign_id: u64,
    pub successful: bool,
    pub raised: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct MilestoneReleasedEvent {
    pub campaign_id: u64,
    pub milestone_index: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct RefundClaimedEvent {
    pub campaign_id: u64,
    pub donor: Address,
    pub amount: i128,
}
