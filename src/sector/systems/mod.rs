//! Rules systems

pub mod advancement;
pub mod combat;
pub mod economy;
pub mod goals;
pub mod turn;
pub mod victory;

pub use advancement::{max_hp_for, upgrade_attribute, xp_cost, XP_COSTS};
pub use combat::{inflict_damage, inflict_faction_damage, Strike};
pub use economy::{base_income, income_for, maintenance_costs, process_income, process_maintenance};
pub use goals::{clear_goal, complete_goal, set_goal, update_goal_progress};
