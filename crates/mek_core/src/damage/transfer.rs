//! Damage transfer through the location graph.

use super::{DamageEvent, DamageReport};
use crate::entity::{DestructionCause, Entity, Location, Points, TransferTarget};
use crate::error::{GameError, Result};

/// One application of damage.
#[derive(Debug, Clone, Copy)]
pub(super) struct Strike {
    location: Location,
    rear: bool,
    amount: u32,
    /// Skip armor, as ammunition explosions do.
    internal_only: bool,
    /// Stop at the struck location instead of transferring (CASE).
    contained: bool,
}

impl Strike {
    pub(super) const fn new(location: Location, rear: bool, amount: u32) -> Self {
        Self {
            location,
            rear,
            amount,
            internal_only: false,
            contained: false,
        }
    }

    pub(super) const fn internal(location: Location, amount: u32, contained: bool) -> Self {
        Self {
            location,
            rear: false,
            amount,
            internal_only: true,
            contained,
        }
    }
}

/// Apply a strike, walking the transfer table until the damage is spent.
pub(super) fn run(entity: &mut Entity, strike: Strike, report: &mut DamageReport) -> Result<()> {
    if !entity.has_location(strike.location) {
        return Err(GameError::NoSuchLocation {
            entity: entity.id,
            location: strike.location,
        });
    }

    let transfer = entity.caps().transfer;
    let mut location = strike.location;
    let mut rear = strike.rear;
    let mut remaining = strike.amount;

    while remaining > 0 {
        if entity.is_location_lost(location) {
            match transfer(location) {
                TransferTarget::Transfer(next) if !strike.contained => {
                    report.push(DamageEvent::DamageTransferred {
                        from: location,
                        to: next,
                        amount: remaining,
                    });
                    location = next;
                    rear = rear && entity.armor(next, true) != Points::NotApplicable;
                    continue;
                }
                TransferTarget::DestroyUnit => {
                    destroy_unit(entity, DestructionCause::LocationLost(location), report);
                }
                _ => {}
            }
            report.push(DamageEvent::DamageAbsorbed {
                location,
                amount: remaining,
            });
            break;
        }

        if !strike.internal_only {
            if let Points::Intact(armor) = entity.armor(location, rear) {
                let absorbed = armor.min(remaining);
                if absorbed > 0 {
                    entity.set_armor(location, rear, Points::Intact(armor - absorbed))?;
                    remaining -= absorbed;
                    report.push(DamageEvent::ArmorDamaged {
                        location,
                        rear,
                        amount: absorbed,
                        remaining: armor - absorbed,
                    });
                }
            }
        }
        if remaining == 0 {
            break;
        }

        let Points::Intact(internal) = entity.internal(location) else {
            return Err(GameError::InvalidState(format!(
                "{location} on entity {} has no internal structure to damage",
                entity.id
            )));
        };
        let absorbed = internal.min(remaining);
        remaining -= absorbed;
        let left = internal - absorbed;
        report.push(DamageEvent::InternalDamaged {
            location,
            amount: absorbed,
            remaining: left,
        });
        if left == 0 {
            lose_location(entity, location, report)?;
        } else {
            entity.set_internal(location, Points::Intact(left))?;
        }
    }
    Ok(())
}

/// Doom a location and apply what losing it means for the unit.
pub(super) fn lose_location(entity: &mut Entity, location: Location, report: &mut DamageReport) -> Result<()> {
    entity.doom_location(location)?;
    report.push(DamageEvent::LocationDestroyed { location });

    if (entity.caps().transfer)(location) == TransferTarget::DestroyUnit {
        destroy_unit(entity, DestructionCause::LocationLost(location), report);
    }

    let attached_arm = match location {
        Location::LeftTorso => Some(Location::LeftArm),
        Location::RightTorso => Some(Location::RightArm),
        _ => None,
    };
    if let Some(arm) = attached_arm {
        if entity.archetype().is_mech() && !entity.is_location_lost(arm) {
            entity.doom_location(arm)?;
            report.push(DamageEvent::LocationDestroyed { location: arm });
        }
    }
    Ok(())
}

pub(super) fn destroy_unit(entity: &mut Entity, cause: DestructionCause, report: &mut DamageReport) {
    if !entity.is_destroyed() {
        entity.destroy(cause);
        report.push(DamageEvent::UnitDestroyed { cause });
    }
}
