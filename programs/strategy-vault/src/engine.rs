use anchor_lang::prelude::*;

use crate::access;
use crate::adapter::StrategySlot;
use crate::constants::{MAX_BPS, SLOTS_PER_YEAR};
use crate::errors::VaultError;
use crate::state::{mul_div, StrategyRegistry, VaultState};

/// Capital moved by a rebalance or emergency drain
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RebalanceReport {
    pub deployed: u64,
    pub recalled: u64,
    /// Principal lost by strategies and written off `total_assets`
    pub written_off: u64,
    pub degraded: Vec<Pubkey>,
}

/// Liquidity pulled back from strategies to cover a payout
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SourcingReport {
    pub pulled: u64,
    pub degraded: Vec<Pubkey>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub harvested: u64,
    pub apy_bps: u16,
    pub written_off: u64,
    pub degraded: Vec<Pubkey>,
}

/// A strategy that can give liquidity back during sourcing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Position in the slot list
    pub index: usize,
    pub health_score: u8,
    pub weight_bps: u16,
    pub available: u64,
}

/// Move every active strategy to `total_assets * weight / 10000`
///
/// Over-allocated strategies are drained first so the freed capital can fill
/// the under-allocated ones in the same pass. Principal is measured as
/// `min(balance, deployed)`: accrued yield stays put until harvested. Losses
/// are booked before any target is computed.
pub fn rebalance(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    slots: &mut [StrategySlot],
) -> Result<RebalanceReport> {
    access::require_unpaused(vault)?;

    let mut report = RebalanceReport {
        written_off: book_losses(vault, registry, slots)?,
        ..RebalanceReport::default()
    };
    let mut fills: Vec<(usize, u64)> = Vec::new();

    for (index, slot) in slots.iter_mut().enumerate() {
        let (active, weight_bps, deployed) = match registry.get(&slot.id) {
            Some(entry) => (entry.active, entry.weight_bps, entry.deployed),
            None => continue,
        };
        if !active && deployed == 0 {
            continue;
        }

        let target = if active {
            mul_div(vault.total_assets, weight_bps as u64, MAX_BPS)?
        } else {
            0
        };

        let current = match observe(slot) {
            Ok(Some(balance)) => balance.min(deployed),
            Ok(None) => continue,
            Err(err) => {
                mark_degraded(registry, &mut report.degraded, slot.id, &err);
                continue;
            }
        };

        if current > target {
            let amount = current - target;
            match slot.handle.withdraw_from(amount) {
                Ok(received) => {
                    let received = received.min(amount);
                    record_recall(vault, registry, &slot.id, received)?;
                    report.recalled = report
                        .recalled
                        .checked_add(received)
                        .ok_or(error!(VaultError::MathOverflow))?;
                }
                Err(err) => mark_degraded(registry, &mut report.degraded, slot.id, &err),
            }
        } else if target > current {
            fills.push((index, target - current));
        }
    }

    for (index, gap) in fills {
        let amount = gap.min(vault.idle_assets);
        if amount == 0 {
            break;
        }

        let slot = &mut slots[index];
        match slot.handle.deposit_into(amount) {
            Ok(()) => {
                record_deployment(vault, registry, &slot.id, amount)?;
                report.deployed = report
                    .deployed
                    .checked_add(amount)
                    .ok_or(error!(VaultError::MathOverflow))?;
            }
            Err(err) => mark_degraded(registry, &mut report.degraded, slot.id, &err),
        }
    }

    if report.deployed > 0 || report.recalled > 0 {
        msg!(
            "Rebalanced: deployed {} recalled {} idle {}",
            report.deployed,
            report.recalled,
            vault.idle_assets
        );
    }

    Ok(report)
}

/// Split `need` across candidates
///
/// Candidates are drained in ascending health order. When every candidate has
/// the same health the split is weight-proportional instead. Whatever rounding
/// or a capped candidate leaves uncovered is then filled sequentially.
pub fn plan_pulls(candidates: &[Candidate], need: u64) -> Result<Vec<(usize, u64)>> {
    let mut ordered: Vec<Candidate> = candidates
        .iter()
        .copied()
        .filter(|c| c.available > 0)
        .collect();
    let mut plan: Vec<(usize, u64)> = Vec::new();
    let mut remaining = need;

    if need == 0 || ordered.is_empty() {
        return Ok(plan);
    }

    let equal_health = ordered
        .windows(2)
        .all(|pair| pair[0].health_score == pair[1].health_score);
    let total_weight: u64 = ordered.iter().map(|c| c.weight_bps as u64).sum();

    if equal_health && total_weight > 0 {
        for candidate in &ordered {
            let share = mul_div(need, candidate.weight_bps as u64, total_weight)?
                .min(candidate.available);
            if share > 0 {
                plan.push((candidate.index, share));
                remaining = remaining.saturating_sub(share);
            }
        }
    } else {
        ordered.sort_by_key(|c| c.health_score);
    }

    for candidate in &ordered {
        if remaining == 0 {
            break;
        }

        let planned = plan
            .iter()
            .find(|(index, _)| *index == candidate.index)
            .map(|(_, amount)| *amount)
            .unwrap_or(0);
        let extra = candidate.available.saturating_sub(planned).min(remaining);
        if extra == 0 {
            continue;
        }

        match plan.iter_mut().find(|(index, _)| *index == candidate.index) {
            Some(pull) => pull.1 += extra,
            None => plan.push((candidate.index, extra)),
        }
        remaining -= extra;
    }

    Ok(plan)
}

/// Write down every supplied strategy whose balance fell below its principal
///
/// The shortfall comes off `deployed` and `total_assets` together, so all
/// holders share the loss through the share price. Strategies that cannot be
/// read are skipped here and degraded by the caller's own pass.
pub fn book_losses(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    slots: &[StrategySlot],
) -> Result<u64> {
    let mut written_off: u64 = 0;

    for slot in slots {
        let deployed = match registry.get(&slot.id) {
            Some(entry) if entry.deployed > 0 => entry.deployed,
            _ => continue,
        };
        let balance = match slot.handle.get_balance() {
            Ok(balance) if balance < deployed => balance,
            _ => continue,
        };

        let loss = deployed - balance;
        registry.entry_mut(&slot.id)?.deployed = balance;
        vault.total_assets = vault
            .total_assets
            .checked_sub(loss)
            .ok_or(error!(VaultError::MathOverflow))?;
        written_off = written_off
            .checked_add(loss)
            .ok_or(error!(VaultError::MathOverflow))?;

        msg!(
            "Strategy {} lost {}, principal written down to {}",
            slot.id,
            loss,
            balance
        );
    }

    Ok(written_off)
}

/// Fails unless every strategy holding vault capital is among `slots`
pub fn require_complete(registry: &StrategyRegistry, slots: &[StrategySlot]) -> Result<()> {
    let complete = registry
        .strategies
        .iter()
        .filter(|entry| entry.deployed > 0)
        .all(|entry| slots.iter().any(|slot| slot.id == entry.id));
    require!(complete, VaultError::IncompleteStrategySet);
    Ok(())
}

/// Idle assets plus the principal each supplied strategy can return right now
pub fn available_liquidity(
    vault: &VaultState,
    registry: &StrategyRegistry,
    slots: &[StrategySlot],
) -> Result<u64> {
    let mut total = vault.idle_assets;

    for slot in slots {
        let deployed = match registry.get(&slot.id) {
            Some(entry) if entry.deployed > 0 => entry.deployed,
            _ => continue,
        };
        if let Ok(Some(balance)) = observe(slot) {
            total = total
                .checked_add(balance.min(deployed))
                .ok_or(error!(VaultError::MathOverflow))?;
        }
    }

    Ok(total)
}

/// Make `amount` idle, then spend it
///
/// A strategy that errors or under-delivers is dropped from the candidate set
/// and the remaining shortfall is planned again over the others. Fails
/// `InsufficientLiquidity` when the candidates run out first.
pub fn source_payout(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    slots: &mut [StrategySlot],
    amount: u64,
) -> Result<SourcingReport> {
    let mut report = SourcingReport::default();
    let mut excluded: Vec<usize> = Vec::new();

    for _ in 0..=slots.len() {
        if vault.idle_assets >= amount {
            break;
        }
        let need = amount - vault.idle_assets;

        let candidates = collect_candidates(registry, slots, &mut excluded, &mut report.degraded);
        let plan = plan_pulls(&candidates, need)?;
        if plan.is_empty() {
            break;
        }

        for (index, request) in plan {
            let slot = &mut slots[index];
            match slot.handle.withdraw_from(request) {
                Ok(received) => {
                    let received = received.min(request);
                    record_recall(vault, registry, &slot.id, received)?;
                    report.pulled = report
                        .pulled
                        .checked_add(received)
                        .ok_or(error!(VaultError::MathOverflow))?;
                    if received < request {
                        excluded.push(index);
                    }
                }
                Err(err) => {
                    mark_degraded(registry, &mut report.degraded, slot.id, &err);
                    excluded.push(index);
                }
            }
        }
    }

    require!(
        vault.idle_assets >= amount,
        VaultError::InsufficientLiquidity
    );
    vault.idle_assets -= amount;

    Ok(report)
}

/// Realise the yield a strategy accrued above its principal
///
/// Every strategy holding capital must be supplied: losses are booked across
/// all of them and the vault APY is recomputed over all of them. Adapter
/// failures degrade the strategy and leave the ledger untouched. While the
/// vault has no shares nothing is realised, so an empty vault never ends up
/// with assets.
pub fn harvest(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    slots: &mut [StrategySlot],
    strategy_id: &Pubkey,
    current_slot: u64,
) -> Result<HarvestReport> {
    access::require_unpaused(vault)?;
    require!(
        registry.get(strategy_id).is_some_and(|entry| entry.active),
        VaultError::StrategyNotActive
    );
    require_complete(registry, slots)?;

    let written_off = book_losses(vault, registry, slots)?;
    let (deployed, last_harvest_slot, previous_apy) = {
        let entry = registry.entry(strategy_id)?;
        (entry.deployed, entry.last_harvest_slot, entry.apy_bps)
    };

    let slot = slots
        .iter_mut()
        .find(|s| s.id == *strategy_id)
        .ok_or(error!(VaultError::StrategyNotFound))?;

    let mut report = HarvestReport {
        apy_bps: previous_apy,
        written_off,
        ..HarvestReport::default()
    };

    match pull_yield(slot, deployed, vault.total_shares) {
        Ok(harvested) => {
            vault.total_assets = vault
                .total_assets
                .checked_add(harvested)
                .ok_or(error!(VaultError::MathOverflow))?;
            vault.idle_assets = vault
                .idle_assets
                .checked_add(harvested)
                .ok_or(error!(VaultError::MathOverflow))?;

            let elapsed = current_slot.saturating_sub(last_harvest_slot);
            let apy_bps = realised_apy(harvested, deployed, elapsed).unwrap_or(previous_apy);

            let entry = registry.entry_mut(strategy_id)?;
            entry.total_earned = entry
                .total_earned
                .checked_add(harvested)
                .ok_or(error!(VaultError::MathOverflow))?;
            entry.last_harvest_slot = current_slot;
            entry.apy_bps = apy_bps;
            entry.recover();

            slot.handle.on_harvest(apy_bps);
            report.harvested = harvested;
            report.apy_bps = apy_bps;
        }
        Err(err) => mark_degraded(registry, &mut report.degraded, *strategy_id, &err),
    }

    vault.weighted_apy_bps = weighted_apy(vault, registry, slots)?;

    Ok(report)
}

/// Pull all deployed principal back to idle
///
/// Runs regardless of the pause flag. Failing strategies are degraded and
/// left where they are.
pub fn recall_all(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    slots: &mut [StrategySlot],
) -> Result<RebalanceReport> {
    let mut report = RebalanceReport {
        written_off: book_losses(vault, registry, slots)?,
        ..RebalanceReport::default()
    };

    for slot in slots.iter_mut() {
        let deployed = match registry.get(&slot.id) {
            Some(entry) if entry.deployed > 0 => entry.deployed,
            _ => continue,
        };

        let amount = match slot.handle.get_balance() {
            Ok(balance) => balance.min(deployed),
            Err(err) => {
                mark_degraded(registry, &mut report.degraded, slot.id, &err);
                continue;
            }
        };
        if amount == 0 {
            continue;
        }

        match slot.handle.withdraw_from(amount) {
            Ok(received) => {
                let received = received.min(amount);
                record_recall(vault, registry, &slot.id, received)?;
                report.recalled = report
                    .recalled
                    .checked_add(received)
                    .ok_or(error!(VaultError::MathOverflow))?;
            }
            Err(err) => mark_degraded(registry, &mut report.degraded, slot.id, &err),
        }
    }

    Ok(report)
}

/// Balance-weighted APY over the given strategies
pub fn weighted_apy(
    vault: &VaultState,
    registry: &StrategyRegistry,
    slots: &[StrategySlot],
) -> Result<u16> {
    if vault.total_assets == 0 {
        return Ok(0);
    }

    let mut weighted: u128 = 0;
    for slot in slots.iter().filter(|s| registry.get(&s.id).is_some()) {
        if let (Ok(apy_bps), Ok(balance)) = (slot.handle.estimate_apy(), slot.handle.get_balance()) {
            weighted = weighted
                .checked_add(apy_bps as u128 * balance as u128)
                .ok_or(error!(VaultError::MathOverflow))?;
        }
    }

    let apy = weighted / vault.total_assets as u128;
    Ok(u16::try_from(apy).unwrap_or(u16::MAX))
}

/// Annualised yield in bps; `None` when there is nothing to annualise
fn realised_apy(harvested: u64, deployed: u64, elapsed_slots: u64) -> Option<u16> {
    if deployed == 0 || elapsed_slots == 0 {
        return None;
    }

    let apy = (harvested as u128)
        .checked_mul(SLOTS_PER_YEAR as u128)?
        .checked_mul(MAX_BPS as u128)?
        / (deployed as u128 * elapsed_slots as u128);
    Some(u16::try_from(apy).unwrap_or(u16::MAX))
}

fn pull_yield(slot: &mut StrategySlot, deployed: u64, total_shares: u64) -> Result<u64> {
    let balance = slot.handle.get_balance()?;
    let accrued = balance.saturating_sub(deployed);
    if accrued == 0 || total_shares == 0 {
        return Ok(0);
    }

    let received = slot.handle.withdraw_from(accrued)?;
    Ok(received.min(accrued))
}

/// Balance of a strategy that reports itself usable
fn observe(slot: &StrategySlot) -> Result<Option<u64>> {
    if !slot.handle.get_info()?.active {
        return Ok(None);
    }
    Ok(Some(slot.handle.get_balance()?))
}

fn collect_candidates(
    registry: &mut StrategyRegistry,
    slots: &[StrategySlot],
    excluded: &mut Vec<usize>,
    degraded: &mut Vec<Pubkey>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for (index, slot) in slots.iter().enumerate() {
        if excluded.contains(&index) {
            continue;
        }
        let (health_score, weight_bps, deployed) = match registry.get(&slot.id) {
            Some(entry) if entry.deployed > 0 => {
                (entry.health_score, entry.weight_bps, entry.deployed)
            }
            _ => continue,
        };

        match observe(slot) {
            Ok(Some(balance)) => candidates.push(Candidate {
                index,
                health_score,
                weight_bps,
                available: balance.min(deployed),
            }),
            Ok(None) => excluded.push(index),
            Err(err) => {
                mark_degraded(registry, degraded, slot.id, &err);
                excluded.push(index);
            }
        }
    }

    candidates
}

fn mark_degraded(
    registry: &mut StrategyRegistry,
    degraded: &mut Vec<Pubkey>,
    id: Pubkey,
    err: &anchor_lang::error::Error,
) {
    if let Some(entry) = registry.get_mut(&id) {
        entry.degrade();
        msg!(
            "Strategy {} degraded to health {}: {}",
            id,
            entry.health_score,
            err
        );
    }
    if !degraded.contains(&id) {
        degraded.push(id);
    }
}

fn record_deployment(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    id: &Pubkey,
    amount: u64,
) -> Result<()> {
    vault.idle_assets = vault
        .idle_assets
        .checked_sub(amount)
        .ok_or(error!(VaultError::MathOverflow))?;

    let entry = registry.entry_mut(id)?;
    entry.deployed = entry
        .deployed
        .checked_add(amount)
        .ok_or(error!(VaultError::MathOverflow))?;
    Ok(())
}

fn record_recall(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    id: &Pubkey,
    received: u64,
) -> Result<()> {
    vault.idle_assets = vault
        .idle_assets
        .checked_add(received)
        .ok_or(error!(VaultError::MathOverflow))?;

    let entry = registry.entry_mut(id)?;
    entry.deployed = entry.deployed.saturating_sub(received);
    Ok(())
}
