//! AI profiles: per-skill-level tuning for the game AI.

use bitflags::bitflags;
use tbl_parse::{FileSystem, Parser};

use crate::embedded;
use crate::error::Result;
use crate::modular::{LoadConfig, LoadOutcome, TableKind, load_kind};
use crate::registry::{Record, Registry};

/// Number of difficulty levels each list covers.
pub const NUM_SKILL_LEVELS: usize = 5;

/// Most profiles a registry holds.
pub const MAX_AI_PROFILES: usize = 5;

bitflags! {
    /// Boolean AI behaviour switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AiProfileFlags: u32 {
        const BIG_SHIPS_CAN_ATTACK_BEAM_TURRETS_ON_UNTARGETED_SHIPS = 1 << 0;
        const SMART_PRIMARY_WEAPON_SELECTION = 1 << 1;
        const SMART_SECONDARY_WEAPON_SELECTION = 1 << 2;
        const SMART_SHIELD_MANAGEMENT = 1 << 3;
        const AI_CHASE_ALLOWS_REARM = 1 << 4;
        const AI_CHASE_DISABLES_DYNAMIC_TARGETING_TEMPORARILY = 1 << 5;
        const ALLOW_RAPID_SECONDARY_DUMBFIRE = 1 << 6;
        const HUGE_TURRET_WEAPONS_IGNORE_BOMBS = 1 << 7;
        const DONT_INSERT_RANDOM_TURRET_FIRE_DELAY = 1 << 8;
        const HACK_IMPROVE_NON_HOMING_SWARM_TURRET_FIRE_ACCURACY = 1 << 9;
        const SHOCKWAVES_DAMAGE_SMALL_SHIP_SUBSYSTEMS = 1 << 10;
        const NAVIGATION_SUBSYS_GOVERNS_WARP = 1 << 11;
        const NO_MIN_DOCK_SPEED_CAP = 1 << 12;
    }
}

/// Table tag for each flag.
const FLAG_TAGS: &[(&str, AiProfileFlags)] = &[
    (
        "$big ships can attack beam turrets on untargeted ships:",
        AiProfileFlags::BIG_SHIPS_CAN_ATTACK_BEAM_TURRETS_ON_UNTARGETED_SHIPS,
    ),
    ("$ai-chase allows rearm:", AiProfileFlags::AI_CHASE_ALLOWS_REARM),
    (
        "$ai-chase disables dynamic targeting temporarily:",
        AiProfileFlags::AI_CHASE_DISABLES_DYNAMIC_TARGETING_TEMPORARILY,
    ),
    (
        "$smart primary weapon selection:",
        AiProfileFlags::SMART_PRIMARY_WEAPON_SELECTION,
    ),
    (
        "$smart secondary weapon selection:",
        AiProfileFlags::SMART_SECONDARY_WEAPON_SELECTION,
    ),
    ("$smart shield management:", AiProfileFlags::SMART_SHIELD_MANAGEMENT),
    (
        "$allow rapid secondary dumbfire:",
        AiProfileFlags::ALLOW_RAPID_SECONDARY_DUMBFIRE,
    ),
    (
        "$huge turret weapons ignore bombs:",
        AiProfileFlags::HUGE_TURRET_WEAPONS_IGNORE_BOMBS,
    ),
    (
        "$don't insert random turret fire delay:",
        AiProfileFlags::DONT_INSERT_RANDOM_TURRET_FIRE_DELAY,
    ),
    (
        "$hack improve non-homing swarm turret fire accuracy:",
        AiProfileFlags::HACK_IMPROVE_NON_HOMING_SWARM_TURRET_FIRE_ACCURACY,
    ),
    (
        "$shockwaves damage small ship subsystems:",
        AiProfileFlags::SHOCKWAVES_DAMAGE_SMALL_SHIP_SUBSYSTEMS,
    ),
    (
        "$navigation subsystem governs warpout capability:",
        AiProfileFlags::NAVIGATION_SUBSYS_GOVERNS_WARP,
    ),
    (
        "$don't limit min speed of docked ship:",
        AiProfileFlags::NO_MIN_DOCK_SPEED_CAP,
    ),
];

type SkillFloats = [f32; NUM_SKILL_LEVELS];
type SkillInts = [i32; NUM_SKILL_LEVELS];

/// One named AI profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiProfile {
    pub profile_name: String,
    pub flags: AiProfileFlags,

    pub afterburner_recharge_scale: SkillFloats,
    pub beam_friendly_damage_cap: SkillFloats,
    pub cmeasure_life_scale: SkillFloats,
    pub cmeasure_fire_chance: SkillFloats,
    pub in_range_time: SkillFloats,
    pub link_ammo_levels_always: SkillFloats,
    pub link_ammo_levels_maybe: SkillFloats,
    pub link_energy_levels_always: SkillFloats,
    pub link_energy_levels_maybe: SkillFloats,
    pub player_damage_scale: SkillFloats,
    pub subsys_damage_scale: SkillFloats,
    pub shield_energy_scale: SkillFloats,
    pub shield_manage_delay: SkillFloats,
    pub ship_fire_delay_scale_friendly: SkillFloats,
    pub ship_fire_delay_scale_hostile: SkillFloats,
    pub turn_time_scale: SkillFloats,
    pub weapon_energy_scale: SkillFloats,

    pub max_allowed_player_homers: SkillInts,
    pub max_attackers: SkillInts,
    pub max_incoming_asteroids: SkillInts,

    /// Seconds in 16.16 fixed point.
    pub predict_position_delay: SkillInts,
}

impl Record for AiProfile {
    fn name(&self) -> &str {
        &self.profile_name
    }

    fn set_name(&mut self, name: String) {
        self.profile_name = name;
    }
}

/// Float list fields, by tag. Some fields accept an older tag as well.
fn float_field<'a>(profile: &'a mut AiProfile, tag: &str) -> Option<&'a mut SkillFloats> {
    let field = match tag {
        "$Player Afterburner Recharge Scale:" => &mut profile.afterburner_recharge_scale,
        "$Max Beam Friendly Fire Damage:" => &mut profile.beam_friendly_damage_cap,
        "$Player Countermeasure Life Scale:" => &mut profile.cmeasure_life_scale,
        "$AI Countermeasure Firing Chance:" => &mut profile.cmeasure_fire_chance,
        "$AI In Range Time:" => &mut profile.in_range_time,
        "$AI Always Links Ammo Weapons:" => &mut profile.link_ammo_levels_always,
        "$AI Maybe Links Ammo Weapons:" => &mut profile.link_ammo_levels_maybe,
        "$AI Always Links Energy Weapons:" => &mut profile.link_energy_levels_always,
        "$AI Maybe Links Energy Weapons:" => &mut profile.link_energy_levels_maybe,
        "$Player Damage Factor:" | "$AI Damage Reduction to Player Hull:" => {
            &mut profile.player_damage_scale
        }
        "$Player Subsys Damage Factor:" | "$AI Damage Reduction to Player Subsys:" => {
            &mut profile.subsys_damage_scale
        }
        "$Player Shield Recharge Scale:" => &mut profile.shield_energy_scale,
        "$AI Shield Manage Delay:" | "$AI Shield Manage Delays:" => {
            &mut profile.shield_manage_delay
        }
        "$Friendly AI Fire Delay Scale:" => &mut profile.ship_fire_delay_scale_friendly,
        "$Hostile AI Fire Delay Scale:" => &mut profile.ship_fire_delay_scale_hostile,
        "$AI Turn Time Scale:" => &mut profile.turn_time_scale,
        "$Player Weapon Recharge Scale:" => &mut profile.weapon_energy_scale,
        _ => return None,
    };
    Some(field)
}

const FLOAT_TAGS: &[&str] = &[
    "$Player Afterburner Recharge Scale:",
    "$Max Beam Friendly Fire Damage:",
    "$Player Countermeasure Life Scale:",
    "$AI Countermeasure Firing Chance:",
    "$AI In Range Time:",
    "$AI Always Links Ammo Weapons:",
    "$AI Maybe Links Ammo Weapons:",
    "$AI Always Links Energy Weapons:",
    "$AI Maybe Links Energy Weapons:",
    "$Player Damage Factor:",
    "$AI Damage Reduction to Player Hull:",
    "$Player Subsys Damage Factor:",
    "$AI Damage Reduction to Player Subsys:",
    "$Player Shield Recharge Scale:",
    "$AI Shield Manage Delay:",
    "$AI Shield Manage Delays:",
    "$Friendly AI Fire Delay Scale:",
    "$Hostile AI Fire Delay Scale:",
    "$AI Turn Time Scale:",
    "$Player Weapon Recharge Scale:",
];

fn to_fixed(value: f32) -> i32 {
    (value * 65536.0) as i32
}

/// The AI profiles table kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiProfiles;

impl TableKind for AiProfiles {
    type Record = AiProfile;

    const SECTION: &'static str = "#AI Profiles";
    const NAME_TAG: &'static str = "$Profile Name:";
    const DEFAULT_TAG: &'static str = "$Default Profile:";
    const BASE_FILE: &'static str = "ai_profiles.tbl";
    const OVERLAY_PATTERN: &'static str = "*-aip.tbm";
    const MAX_RECORDS: usize = MAX_AI_PROFILES;
    const EMBEDDED: &'static str = embedded::AI_PROFILES_TBL;

    fn parse_field(p: &mut Parser, profile: &mut AiProfile) -> tbl_parse::Result<bool> {
        for tag in FLOAT_TAGS {
            if p.optional_string(tag) {
                if let Some(field) = float_field(profile, tag) {
                    p.parse_float_list(field)?;
                }
                return Ok(true);
            }
        }

        let int_field = if p.optional_string("$Max Missles Locked on Player:") {
            Some(&mut profile.max_allowed_player_homers)
        } else if p.optional_string("$Max Player Attackers:") {
            Some(&mut profile.max_attackers)
        } else if p.optional_string("$Max Incoming Asteroids:") {
            Some(&mut profile.max_incoming_asteroids)
        } else {
            None
        };
        if let Some(field) = int_field {
            p.parse_int_list(field)?;
            return Ok(true);
        }

        if p.optional_string("$Predict Position Delay:") {
            let mut seconds = [0.0; NUM_SKILL_LEVELS];
            p.parse_float_list(&mut seconds)?;
            profile.predict_position_delay = seconds.map(to_fixed);
            return Ok(true);
        }

        for &(tag, flag) in FLAG_TAGS {
            if p.optional_string(tag) {
                let value = p.stuff_boolean(false)?;
                profile.flags.set(flag, value);
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Loads the built-in profiles, `ai_profiles.tbl` and every `*-aip.tbm`.
pub fn load_ai_profiles(
    fs: &dyn FileSystem,
    config: &LoadConfig,
) -> Result<(Registry<AiProfile>, LoadOutcome)> {
    load_kind::<AiProfiles>(fs, config)
}
