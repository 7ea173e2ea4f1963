//! End-to-end behaviour of the reward ledger against nullable ports.

mod common;

use bela_ledger::{
    Asset, BlacklistTarget, ErrorClass, LedgerError, LedgerEvent, OracleError, RewardCategory,
    RewardLedger, Slot, Token, TokenError,
};
use bela_sybil::SybilError;
use bela_types::{BgpAmount, LedgerParams, NativeAmount, UsdtAmount, BGP_UNIT, USDT_UNIT};
use common::{addr, fee, identity_for, Harness, HALF_DAY, MIN_FEE};

fn bgp(whole: u128) -> u128 {
    whole * BGP_UNIT
}

// ---------------------------------------------------------------------------
// Interaction and early bonus
// ---------------------------------------------------------------------------

#[test]
fn first_interaction_without_referrer_earns_early_bonus() {
    let mut h = Harness::new();
    let a = h.join(1, None);

    let receipt = h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(receipt.slot, Slot::First);
    assert_eq!(receipt.early_bird_bonus, Some(BgpAmount::from_whole(5_000)));
    assert_eq!(h.bgp(&a), bgp(7_000));

    let account = h.ledger.get_account(&a).unwrap();
    assert!(account.has_claimed_early_bird);
    assert_eq!(account.contribution, 20);
    assert_eq!(account.total_interaction_bgp, BgpAmount::from_whole(2_000));
    assert_eq!(h.ledger.global_stats().total_registered, 1);

    h.advance(HALF_DAY);
    let receipt = h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(receipt.slot, Slot::Second);
    assert_eq!(receipt.early_bird_bonus, None);
    assert_eq!(h.bgp(&a), bgp(9_000));
    assert_eq!(h.ledger.get_account(&a).unwrap().contribution, 40);
    assert_eq!(h.ledger.global_stats().total_registered, 1);
}

#[test]
fn early_bonus_respects_limit() {
    let mut params = LedgerParams::default();
    params.early_bird_limit = 2;
    let mut h = Harness::with_params(params);

    for seed in 1..=3 {
        let account = h.join(seed, None);
        h.ledger.interact(&account, fee()).unwrap();
    }
    assert!(h.ledger.get_account(&addr(1)).unwrap().has_claimed_early_bird);
    assert!(h.ledger.get_account(&addr(2)).unwrap().has_claimed_early_bird);
    assert!(!h.ledger.get_account(&addr(3)).unwrap().has_claimed_early_bird);
    assert_eq!(h.bgp(&addr(3)), bgp(2_000));

    let stats = h.ledger.global_stats();
    assert_eq!(stats.total_registered, 2);
    assert_eq!(stats.early_bird_remaining, 0);
}

#[test]
fn referred_account_gets_no_early_bonus() {
    let mut h = Harness::new();
    h.join(1, None);
    let b = h.join(2, Some(1));
    let receipt = h.ledger.interact(&b, fee()).unwrap();
    assert_eq!(receipt.early_bird_bonus, None);
    assert_eq!(h.bgp(&b), bgp(2_000));
}

#[test]
fn third_interaction_in_a_day_is_refused() {
    let mut h = Harness::new();
    let a = h.join(1, None);

    h.ledger.interact(&a, fee()).unwrap();
    h.advance(HALF_DAY);
    h.ledger.interact(&a, fee()).unwrap();
    h.advance(HALF_DAY / 2);
    let err = h.ledger.interact(&a, fee()).unwrap_err();
    assert_eq!(err, LedgerError::SlotAlreadyClaimed { slot: Slot::Second });
    assert_eq!(err.class(), ErrorClass::StateConflict);

    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.today_interaction_count, 2);
    assert_eq!(account.total_interaction_count, 2);

    // Next day: back to the first slot.
    h.advance(HALF_DAY);
    h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(h.ledger.get_account(&a).unwrap().today_interaction_count, 1);
}

#[test]
fn same_slot_twice_changes_nothing() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    let before = h.ledger.get_account(&a).unwrap();
    let interactions = h.ledger.global_stats().total_interactions;

    h.advance(60);
    assert!(matches!(
        h.ledger.interact(&a, fee()),
        Err(LedgerError::SlotAlreadyClaimed { slot: Slot::First })
    ));
    assert_eq!(h.ledger.get_account(&a).unwrap(), before);
    assert_eq!(h.ledger.global_stats().total_interactions, interactions);
}

#[test]
fn daily_count_reads_zero_on_a_new_day() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    h.advance(HALF_DAY);
    h.ledger.interact(&a, fee()).unwrap();

    h.advance(HALF_DAY);
    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.today_interaction_count, 0);
    assert_eq!(account.total_interaction_count, 2);
    assert_eq!(h.ledger.check_interaction_status(&a).today_count, 0);
}

#[test]
fn interaction_status_tracks_slots() {
    let mut h = Harness::new();
    let a = h.join(1, None);

    let status = h.ledger.check_interaction_status(&a);
    assert!(status.can_interact);
    assert_eq!(status.today_count, 0);
    assert!(status.slot_one_available);

    h.ledger.interact(&a, fee()).unwrap();
    let status = h.ledger.check_interaction_status(&a);
    assert!(!status.can_interact);
    assert_eq!(status.today_count, 1);
    assert!(!status.slot_one_available);
    assert!(status.slot_two_available);
    let noon = (h.now().day_index()) * 86_400 + HALF_DAY;
    assert_eq!(status.next_slot_time.as_secs(), noon);
}

// ---------------------------------------------------------------------------
// Fees and oracle
// ---------------------------------------------------------------------------

#[test]
fn fee_below_minimum_is_refused() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    let err = h.ledger.interact(&a, NativeAmount::new(MIN_FEE - 1)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientFee {
            paid: NativeAmount::new(MIN_FEE - 1),
            required: NativeAmount::new(MIN_FEE),
        }
    );
    assert_eq!(h.bgp(&a), 0);
    assert_eq!(h.ledger.get_account(&a).unwrap().total_interaction_count, 0);
}

#[test]
fn excess_fee_is_retained() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.ledger.interact(&a, NativeAmount::new(MIN_FEE * 3)).unwrap();
    assert_eq!(h.ledger.global_stats().fee_pool, NativeAmount::new(MIN_FEE * 3));
    assert_eq!(h.ledger.minimum_fee().unwrap(), fee());
}

#[test]
fn unavailable_oracle_fails_closed() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.oracle.set_unavailable("feed down");
    let err = h.ledger.interact(&a, NativeAmount::new(u128::MAX)).unwrap_err();
    assert!(matches!(err, LedgerError::OracleUnavailable(OracleError::Unavailable(_))));
    assert_eq!(err.class(), ErrorClass::Resource);
}

#[test]
fn stale_oracle_fails_closed() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.clock.advance(3_601);
    assert!(matches!(
        h.ledger.interact(&a, fee()),
        Err(LedgerError::OracleUnavailable(OracleError::Stale { .. }))
    ));
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[test]
fn failed_settlement_leaves_no_trace() {
    let mut h = Harness::new();
    h.join(1, None);
    let b = h.join(2, Some(1));
    let participants = h.ledger.global_stats().total_participants;

    h.tokens.fail_next(TokenError::Rejected("token service down".into()));
    let err = h.ledger.interact(&b, fee()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Resource);

    let account = h.ledger.get_account(&b).unwrap();
    assert_eq!(account.total_interaction_count, 0);
    assert_eq!(account.contribution, 0);
    assert_eq!(h.ledger.get_account(&addr(1)).unwrap().contribution, 0);
    assert_eq!(h.ledger.global_stats().total_interactions, 0);
    assert_eq!(h.ledger.global_stats().total_participants, participants);

    // The slot was not consumed.
    h.ledger.interact(&b, fee()).unwrap();
    assert_eq!(h.ledger.get_account(&addr(1)).unwrap().contribution, 8);
}

// ---------------------------------------------------------------------------
// Referral
// ---------------------------------------------------------------------------

#[test]
fn direct_referrer_is_paid_on_downline_interaction() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    let b = h.join(2, Some(1));

    h.ledger.interact(&b, fee()).unwrap();

    let upline = h.ledger.get_account(&a).unwrap();
    assert_eq!(upline.total_referral_bgp, BgpAmount::from_whole(800));
    assert_eq!(upline.contribution, 8);
    assert_eq!(h.bgp(&a), bgp(800));
    assert_eq!(h.ledger.get_account(&b).unwrap().contribution, 20);

    let record = h.ledger.reward_records(&a).last().unwrap();
    assert_eq!(record.category, RewardCategory::Referral);
    assert_eq!(record.source.as_ref(), Some(&b));
}

#[test]
fn registration_updates_counters_and_referral_list() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    let b = h.join(2, Some(1));
    h.advance(10);
    let c = h.join(3, Some(1));
    h.join(4, Some(3));

    let upline = h.ledger.get_account(&a).unwrap();
    assert_eq!(upline.direct_referral_count, 2);
    assert_eq!(upline.team_size, 3);

    let referrals = h.ledger.direct_referrals(&a);
    assert_eq!(referrals.len(), 2);
    assert_eq!(referrals[0].account, b);
    assert_eq!(referrals[1].account, c);
    assert!(referrals[1].bound_at > referrals[0].bound_at);

    assert_eq!(h.ledger.get_account(&c).unwrap().team_size, 1);
    assert_eq!(h.ledger.global_stats().total_participants, 4);
}

#[test]
fn propagation_stops_at_depth_fifteen() {
    let mut h = Harness::new();
    let seeds: Vec<u8> = (1..=17).collect();
    let chain = h.chain(&seeds);
    let leaf = chain.last().unwrap().clone();

    let receipt = h.ledger.interact(&leaf, fee()).unwrap();
    assert_eq!(receipt.referral_payouts, 15);

    let table = h.ledger.params().referral_table.clone();
    for depth in 1..=15usize {
        let ancestor = &chain[chain.len() - 1 - depth];
        let tier = table.tier(depth).unwrap();
        let account = h.ledger.get_account(ancestor).unwrap();
        assert_eq!(account.total_referral_bgp, tier.bgp_reward, "depth {depth}");
        assert_eq!(account.contribution, tier.contribution_credit, "depth {depth}");
    }
    // Root sits at depth 16.
    assert_eq!(h.ledger.get_account(&chain[0]).unwrap().total_referral_bgp, BgpAmount::ZERO);
    assert_eq!(h.bgp(&chain[0]), 0);

    // Team size counts descendants up to depth 15 only.
    assert_eq!(h.ledger.get_account(&chain[0]).unwrap().team_size, 15);
    assert_eq!(h.ledger.get_account(&chain[1]).unwrap().team_size, 15);
}

#[test]
fn blacklisted_ancestor_share_is_skipped() {
    let mut h = Harness::new();
    let chain = h.chain(&[1, 2, 3]);
    let owner = h.owner.clone();
    h.ledger
        .set_blacklist(&owner, BlacklistTarget::Address(chain[1].clone()), "abuse")
        .unwrap();
    h.ledger.drain_events();

    let receipt = h.ledger.interact(&chain[2], fee()).unwrap();
    assert_eq!(receipt.referral_payouts, 1);
    assert_eq!(receipt.referral_skipped, 1);

    assert_eq!(h.ledger.get_account(&chain[1]).unwrap().total_referral_bgp, BgpAmount::ZERO);
    assert_eq!(h.bgp(&chain[1]), 0);
    assert_eq!(h.ledger.get_account(&chain[0]).unwrap().total_referral_bgp, BgpAmount::from_whole(400));

    let events = h.ledger.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        LedgerEvent::ReferralSkipped { depth: 1, .. }
    )));
}

#[test]
fn register_rejects_bad_referrers() {
    let mut h = Harness::new();
    let a = h.join(1, None);

    let stranger = addr(9);
    assert_eq!(
        h.ledger.register(&stranger, Some(&stranger), None),
        Err(LedgerError::SelfReferral)
    );
    assert_eq!(
        h.ledger.register(&stranger, Some(&addr(77)), None),
        Err(LedgerError::UnknownReferrer(addr(77)))
    );
    assert_eq!(
        h.ledger.register(&a, None, None),
        Err(LedgerError::AlreadyRegistered(a.clone()))
    );
    assert!(h.ledger.get_account(&stranger).is_none());

    let b = h.join(2, Some(1));
    assert_eq!(
        h.ledger.register(&b, Some(&a), None),
        Err(LedgerError::AlreadyRegistered(b.clone()))
    );
    // `a` has no referrer yet, but binding `b` would close a loop.
    assert!(matches!(
        h.ledger.register(&a, Some(&b), None),
        Err(LedgerError::ReferralCycle { .. })
    ));
}

#[test]
fn interacting_account_may_bind_referrer_later() {
    let mut h = Harness::new();
    h.join(1, None);
    let b = addr(2);
    let att = h.attester.attest(&b, identity_for(2), h.now());
    h.ledger.bind_identity(&b, &att).unwrap();
    h.ledger.interact(&b, fee()).unwrap();

    h.ledger.register(&b, Some(&addr(1)), None).unwrap();
    assert_eq!(h.ledger.get_account(&b).unwrap().referrer, Some(addr(1)));
    assert_eq!(h.ledger.get_account(&addr(1)).unwrap().direct_referral_count, 1);
}

// ---------------------------------------------------------------------------
// Anti-sybil
// ---------------------------------------------------------------------------

#[test]
fn identity_cap_is_enforced_through_register() {
    let mut h = Harness::new();
    let shared = identity_for(200);
    for seed in 1..=3 {
        let account = addr(seed);
        let att = h.attester.attest(&account, shared, h.now());
        h.ledger.register(&account, None, Some(&att)).unwrap();
    }
    let fourth = addr(4);
    let att = h.attester.attest(&fourth, shared, h.now());
    let err = h.ledger.register(&fourth, None, Some(&att)).unwrap_err();
    assert!(matches!(err, LedgerError::Sybil(SybilError::IdentityCapExceeded { cap: 3, .. })));
    assert_eq!(err.class(), ErrorClass::Resource);
    assert!(h.ledger.get_account(&fourth).is_none());
    assert_eq!(h.ledger.lookup_accounts(&shared).len(), 3);
}

#[test]
fn expired_attestation_is_an_attestation_error() {
    let mut h = Harness::new();
    let a = addr(1);
    let att = h.attester.attest(&a, identity_for(1), h.now());
    h.advance(301);
    let err = h.ledger.register(&a, None, Some(&att)).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Attestation);
    assert!(h.ledger.get_account(&a).is_none());
}

#[test]
fn unbound_account_cannot_interact() {
    let mut h = Harness::new();
    let a = addr(1);
    h.ledger.register(&a, None, None).unwrap();
    assert_eq!(
        h.ledger.interact(&a, fee()),
        Err(LedgerError::IdentityRequired(a.clone()))
    );
}

#[test]
fn identity_requirement_can_be_disabled() {
    let mut params = LedgerParams::default();
    params.require_identity = false;
    let mut h = Harness::with_params(params);
    let a = addr(1);
    h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(h.ledger.global_stats().total_participants, 1);
}

#[test]
fn identity_blacklist_blocks_every_account_on_it() {
    let mut h = Harness::new();
    let shared = identity_for(50);
    let owner = h.owner.clone();
    let mut accounts = Vec::new();
    for seed in 1..=2 {
        let account = addr(seed);
        let att = h.attester.attest(&account, shared, h.now());
        h.ledger.register(&account, None, Some(&att)).unwrap();
        accounts.push(account);
    }

    h.ledger.blacklist_identity(&owner, shared).unwrap();
    for account in &accounts {
        let err = h.ledger.interact(account, fee()).unwrap_err();
        assert!(err.is_blacklisted());
        assert_eq!(err.class(), ErrorClass::Authorization);
        assert!(!h.ledger.check_interaction_status(account).can_interact);
    }

    h.ledger
        .clear_blacklist(&owner, BlacklistTarget::Identity(shared))
        .unwrap();
    h.ledger.interact(&accounts[0], fee()).unwrap();
}

#[test]
fn blacklisted_address_keeps_past_rewards() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    let owner = h.owner.clone();
    h.ledger.interact(&a, fee()).unwrap();
    h.ledger.blacklist_address(&owner, &a).unwrap();

    assert!(h.ledger.is_blacklisted(&a));
    assert!(h.ledger.claim_level_reward(&a, 1).unwrap_err().is_blacklisted());
    assert_eq!(h.bgp(&a), bgp(7_000));

    h.ledger.remove_from_blacklist(&owner, &a).unwrap();
    h.ledger.claim_level_reward(&a, 1).unwrap();
}

#[test]
fn registry_pause_blocks_binding_only() {
    let mut h = Harness::new();
    let owner = h.owner.clone();
    let a = h.join(1, None);
    h.ledger.pause_registry(&owner).unwrap();

    let b = addr(2);
    let att = h.attester.attest(&b, identity_for(2), h.now());
    assert_eq!(
        h.ledger.bind_identity(&b, &att),
        Err(LedgerError::Sybil(SybilError::Paused))
    );
    h.ledger.interact(&a, fee()).unwrap();

    h.ledger.unpause_registry(&owner).unwrap();
    h.ledger.bind_identity(&b, &att).unwrap();
    assert_eq!(h.ledger.anti_sybil_stats().bound_accounts, 2);
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

fn fast_params(contribution: u64) -> LedgerParams {
    let mut params = LedgerParams::default();
    params.interaction_contribution = contribution;
    params
}

#[test]
fn claiming_level_three_at_contribution_one_hundred() {
    let mut h = Harness::with_params(fast_params(100));
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();

    let tier = h.ledger.claim_level_reward(&a, 3).unwrap();
    assert_eq!(tier.usdt_reward, UsdtAmount::from_whole(1));

    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.pending_usdt, UsdtAmount::from_whole(1));
    assert_eq!(account.pending_level_bgp, BgpAmount::from_whole(200));
    assert!(h.ledger.level_claim_status(&a).is_claimed(3));
    assert_eq!(account.current_level, 3);

    assert_eq!(
        h.ledger.claim_level_reward(&a, 3),
        Err(LedgerError::AlreadyClaimed(3))
    );
    assert_eq!(
        h.ledger.claim_level_reward(&a, 4),
        Err(LedgerError::NotReached {
            level: 4,
            contribution: 100
        })
    );
    // Lower levels stay claimable out of order.
    h.ledger.claim_level_reward(&a, 1).unwrap();
    assert_eq!(h.ledger.level_claim_status(&a).bits(), 0b101);
}

#[test]
fn invalid_levels_rejected() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    assert_eq!(h.ledger.claim_level_reward(&a, 0), Err(LedgerError::InvalidLevel(0)));
    assert_eq!(h.ledger.claim_level_reward(&a, 13), Err(LedgerError::InvalidLevel(13)));
}

#[test]
fn auto_level_check_can_be_disabled() {
    let mut h = Harness::with_params(fast_params(100));
    let owner = h.owner.clone();
    h.ledger.set_auto_level_check(&owner, false).unwrap();
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(h.ledger.get_account(&a).unwrap().current_level, 0);

    h.ledger.set_auto_level_check(&owner, true).unwrap();
    h.advance(HALF_DAY);
    h.ledger.interact(&a, fee()).unwrap();
    assert_eq!(h.ledger.get_account(&a).unwrap().current_level, 3);
}

#[test]
fn next_level_requirement_reports_first_unreached() {
    let mut h = Harness::with_params(fast_params(100));
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    let (level, tier) = h.ledger.next_level_requirement(&a).unwrap();
    assert_eq!(level, 4);
    assert_eq!(tier.threshold, 500);
}

// ---------------------------------------------------------------------------
// Withdrawals
// ---------------------------------------------------------------------------

#[test]
fn usdt_withdrawal_requires_minimum() {
    let mut h = Harness::with_params(fast_params(100));
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();

    assert_eq!(h.ledger.withdraw_usdt(&a), Err(LedgerError::NothingToWithdraw));
    h.ledger.claim_level_reward(&a, 3).unwrap();
    assert_eq!(
        h.ledger.withdraw_usdt(&a),
        Err(LedgerError::BelowMinimum {
            pending: UsdtAmount::from_whole(1),
            minimum: UsdtAmount::from_whole(10),
        })
    );
    assert_eq!(h.ledger.get_account(&a).unwrap().pending_usdt, UsdtAmount::from_whole(1));
}

#[test]
fn usdt_withdrawal_moves_entire_pending_balance() {
    let mut h = Harness::with_params(fast_params(10_000));
    h.tokens.fund_pool(Token::Usdt, 1_000 * USDT_UNIT);
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    for level in 1..=6 {
        h.ledger.claim_level_reward(&a, level).unwrap();
    }
    let pending = h.ledger.get_account(&a).unwrap().pending_usdt;
    assert_eq!(pending, UsdtAmount::new(126_600_000));

    let moved = h.ledger.withdraw_usdt(&a).unwrap();
    assert_eq!(moved, pending);
    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.pending_usdt, UsdtAmount::ZERO);
    assert_eq!(account.total_usdt_withdrawn, pending);
    assert_eq!(h.usdt(&a), pending.raw());
    assert_eq!(h.ledger.withdraw_usdt(&a), Err(LedgerError::NothingToWithdraw));
}

#[test]
fn failed_usdt_transfer_keeps_pending() {
    let mut h = Harness::with_params(fast_params(10_000));
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    for level in 1..=6 {
        h.ledger.claim_level_reward(&a, level).unwrap();
    }
    // Pool is empty.
    let err = h.ledger.withdraw_usdt(&a).unwrap_err();
    assert!(matches!(err, LedgerError::Token(TokenError::InsufficientBalance { .. })));
    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.pending_usdt, UsdtAmount::new(126_600_000));
    assert_eq!(account.total_usdt_withdrawn, UsdtAmount::ZERO);
}

#[test]
fn level_bgp_withdrawal_has_no_minimum() {
    let mut h = Harness::with_params(fast_params(10));
    h.tokens.fund_pool(Token::Bgp, bgp(10_000));
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();
    h.ledger.claim_level_reward(&a, 1).unwrap();

    let before = h.bgp(&a);
    let moved = h.ledger.withdraw_level_bgp(&a).unwrap();
    assert_eq!(moved, BgpAmount::from_whole(200));
    assert_eq!(h.bgp(&a), before + bgp(200));
    let account = h.ledger.get_account(&a).unwrap();
    assert_eq!(account.total_level_bgp, BgpAmount::from_whole(200));
    assert_eq!(account.pending_level_bgp, BgpAmount::ZERO);
    assert_eq!(
        h.ledger.reward_records(&a).last().unwrap().category,
        RewardCategory::LevelBgpWithdraw
    );
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[test]
fn admin_calls_require_owner() {
    let mut h = Harness::new();
    let intruder = addr(66);
    for result in [
        h.ledger.pause(&intruder),
        h.ledger.set_auto_level_check(&intruder, false),
        h.ledger.blacklist_address(&intruder, &addr(1)),
        h.ledger.set_max_accounts_per_identity(&intruder, 5),
    ] {
        let err = result.unwrap_err();
        assert_eq!(err, LedgerError::NotOwner(intruder.clone()));
        assert_eq!(err.class(), ErrorClass::Authorization);
    }
    assert!(h.ledger.emergency_withdraw(&intruder, Asset::Native).is_err());
}

#[test]
fn pause_blocks_user_operations() {
    let mut h = Harness::new();
    let owner = h.owner.clone();
    let a = h.join(1, None);
    h.ledger.pause(&owner).unwrap();

    assert_eq!(h.ledger.interact(&a, fee()), Err(LedgerError::Paused));
    assert_eq!(h.ledger.register(&addr(2), Some(&a), None), Err(LedgerError::Paused));
    assert_eq!(h.ledger.claim_level_reward(&a, 1), Err(LedgerError::Paused));
    assert_eq!(h.ledger.withdraw_level_bgp(&a), Err(LedgerError::Paused));
    assert!(h.ledger.is_paused());

    h.ledger.unpause(&owner).unwrap();
    h.ledger.interact(&a, fee()).unwrap();
}

#[test]
fn emergency_withdraw_sweeps_fees_and_tokens() {
    let mut h = Harness::new();
    let owner = h.owner.clone();
    let a = h.join(1, None);
    h.ledger.interact(&a, NativeAmount::new(MIN_FEE * 2)).unwrap();

    let swept = h.ledger.emergency_withdraw(&owner, Asset::Native).unwrap();
    assert_eq!(swept, MIN_FEE * 2);
    assert_eq!(h.ledger.global_stats().fee_pool, NativeAmount::ZERO);
    assert_eq!(
        h.ledger.emergency_withdraw(&owner, Asset::Native),
        Err(LedgerError::NothingToWithdraw)
    );

    h.tokens.fund_pool(Token::Usdt, 42);
    assert_eq!(h.ledger.emergency_withdraw(&owner, Asset::Usdt).unwrap(), 42);
    assert_eq!(h.usdt(&h.treasury), 42);
    assert_eq!(h.usdt(&h.pool), 0);
}

#[test]
fn identity_cap_can_be_raised() {
    let mut h = Harness::new();
    let owner = h.owner.clone();
    h.ledger.set_max_accounts_per_identity(&owner, 4).unwrap();
    let shared = identity_for(9);
    for seed in 1..=4 {
        let account = addr(seed);
        let att = h.attester.attest(&account, shared, h.now());
        h.ledger.bind_identity(&account, &att).unwrap();
    }
    assert_eq!(h.ledger.anti_sybil_stats().max_accounts_per_identity, 4);
    assert_eq!(
        h.ledger.set_max_accounts_per_identity(&owner, 0),
        Err(LedgerError::Sybil(SybilError::InvalidCap))
    );
}

// ---------------------------------------------------------------------------
// Snapshots and events
// ---------------------------------------------------------------------------

#[test]
fn snapshot_restore_preserves_state() {
    let mut h = Harness::new();
    h.chain(&[1, 2, 3]);
    h.ledger.interact(&addr(3), fee()).unwrap();

    let snap = h.ledger.snapshot().unwrap();
    let bytes = snap.to_bytes().unwrap();
    let decoded = bela_ledger::LedgerSnapshot::from_bytes(&bytes).unwrap();
    let restored = RewardLedger::restore(decoded, h.ports()).unwrap();

    assert_eq!(restored.get_account(&addr(1)), h.ledger.get_account(&addr(1)));
    assert_eq!(restored.global_stats(), h.ledger.global_stats());
    assert_eq!(restored.lookup_identity(&addr(2)), Some(identity_for(2)));

    // Slot state survives: the same slot is still consumed.
    let mut restored = restored;
    assert!(matches!(
        restored.interact(&addr(3), fee()),
        Err(LedgerError::SlotAlreadyClaimed { .. })
    ));
}

#[test]
fn events_are_drained_once() {
    let mut h = Harness::new();
    let a = h.join(1, None);
    h.ledger.interact(&a, fee()).unwrap();

    let events = h.ledger.drain_events();
    assert!(matches!(events[0], LedgerEvent::IdentityBound { .. }));
    assert!(events.iter().any(|e| matches!(e, LedgerEvent::Registered { .. })));
    assert!(events.iter().any(|e| matches!(e, LedgerEvent::EarlyBirdGranted { .. })));
    assert!(events.iter().any(|e| matches!(e, LedgerEvent::Interacted { .. })));
    assert!(h.ledger.drain_events().is_empty());
}
