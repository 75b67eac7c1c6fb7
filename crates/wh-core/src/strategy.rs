//! Strategy model: steps, win tiers and step actions
//!
//! A strategy is an ordered list of steps. Each spin plays every bet of the
//! current step, then a transition rule picks the next step:
//!
//! - legacy steps use `continue_on_win` / `reset_on_loss` and the optional
//!   `next_step_on_*` pointers
//! - advanced steps (non-empty `win_tiers`) pick a [`StepAction`] from the
//!   first tier whose payout band contains the spin's payout, or `on_loss`

use serde::{Deserialize, Serialize};

use crate::bet::Bet;
use crate::error::{WhError, WhResult};

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEP ACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the step pointer goes after an action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    NextStep,
    RepeatStep,
    GotoStep,
    Restart,
}

impl ActionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NextStep => "Next Step",
            Self::RepeatStep => "Repeat Step",
            Self::GotoStep => "Go To Step",
            Self::Restart => "Restart",
        }
    }
}

/// Amount moved from carry to bankroll when an action fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "AmountRepr")]
pub enum PocketAmount {
    All,
    Fixed(f64),
}

/// Amount kept in carry after pocketing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "AmountRepr")]
pub enum CarryAmount {
    All,
    Remainder,
    Fixed(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Amount(f64),
    Text(String),
}

impl TryFrom<AmountRepr> for PocketAmount {
    type Error = String;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Amount(x) => Ok(Self::Fixed(x)),
            AmountRepr::Text(s) if s == "all" => Ok(Self::All),
            AmountRepr::Text(s) => Err(format!("unknown pocket amount '{}'", s)),
        }
    }
}

impl From<PocketAmount> for AmountRepr {
    fn from(amount: PocketAmount) -> Self {
        match amount {
            PocketAmount::All => AmountRepr::Text("all".into()),
            PocketAmount::Fixed(x) => AmountRepr::Amount(x),
        }
    }
}

impl TryFrom<AmountRepr> for CarryAmount {
    type Error = String;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Amount(x) => Ok(Self::Fixed(x)),
            AmountRepr::Text(s) => match s.as_str() {
                "all" => Ok(Self::All),
                "remainder" => Ok(Self::Remainder),
                _ => Err(format!("unknown carry amount '{}'", s)),
            },
        }
    }
}

impl From<CarryAmount> for AmountRepr {
    fn from(amount: CarryAmount) -> Self {
        match amount {
            CarryAmount::All => AmountRepr::Text("all".into()),
            CarryAmount::Remainder => AmountRepr::Text("remainder".into()),
            CarryAmount::Fixed(x) => AmountRepr::Amount(x),
        }
    }
}

/// What to do after an advanced step settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAction {
    #[serde(alias = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_step_id: Option<String>,
    #[serde(default, alias = "pocket", skip_serializing_if = "Option::is_none")]
    pub pocket_amount: Option<PocketAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_amount: Option<CarryAmount>,
}

impl StepAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target_step_id: None,
            pocket_amount: None,
            carry_amount: None,
        }
    }

    pub fn next_step() -> Self {
        Self::new(ActionKind::NextStep)
    }

    pub fn repeat_step() -> Self {
        Self::new(ActionKind::RepeatStep)
    }

    pub fn restart() -> Self {
        Self::new(ActionKind::Restart)
    }

    pub fn goto_step(target: impl Into<String>) -> Self {
        Self {
            target_step_id: Some(target.into()),
            ..Self::new(ActionKind::GotoStep)
        }
    }

    pub fn with_pocket(mut self, amount: PocketAmount) -> Self {
        self.pocket_amount = Some(amount);
        self
    }

    pub fn with_carry(mut self, amount: CarryAmount) -> Self {
        self.carry_amount = Some(amount);
        self
    }
}

/// Payout band selecting an action on a winning spin.
///
/// `min_payout` is inclusive, `max_payout` exclusive (`None` = unbounded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinTier {
    pub name: String,
    pub min_payout: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payout: Option<f64>,
    pub action: StepAction,
}

impl WinTier {
    pub fn new(name: impl Into<String>, min_payout: f64, max_payout: Option<f64>, action: StepAction) -> Self {
        Self {
            name: name.into(),
            min_payout,
            max_payout,
            action,
        }
    }

    /// Check if payout falls in this tier
    pub fn contains(&self, payout: f64) -> bool {
        payout >= self.min_payout && self.max_payout.is_none_or(|max| payout < max)
    }
}

/// First tier, in list order, whose band contains `payout`.
pub fn find_tier(tiers: &[WinTier], payout: f64) -> Option<&WinTier> {
    tiers.iter().find(|t| t.contains(payout))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEPS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub continue_on_win: bool,
    #[serde(default)]
    pub reset_on_loss: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_on_win: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_on_loss: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub win_tiers: Vec<WinTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_loss: Option<StepAction>,
}

impl Step {
    pub fn new(id: impl Into<String>, bets: Vec<Bet>) -> Self {
        Self {
            id: id.into(),
            bets,
            continue_on_win: false,
            reset_on_loss: false,
            next_step_on_win: None,
            next_step_on_loss: None,
            win_tiers: Vec::new(),
            on_loss: None,
        }
    }

    pub fn continue_on_win(mut self, value: bool) -> Self {
        self.continue_on_win = value;
        self
    }

    pub fn reset_on_loss(mut self, value: bool) -> Self {
        self.reset_on_loss = value;
        self
    }

    pub fn with_next_on_win(mut self, id: impl Into<String>) -> Self {
        self.next_step_on_win = Some(id.into());
        self
    }

    pub fn with_next_on_loss(mut self, id: impl Into<String>) -> Self {
        self.next_step_on_loss = Some(id.into());
        self
    }

    pub fn with_tier(mut self, tier: WinTier) -> Self {
        self.win_tiers.push(tier);
        self
    }

    pub fn with_on_loss(mut self, action: StepAction) -> Self {
        self.on_loss = Some(action);
        self
    }

    /// A step is advanced when it defines win tiers.
    pub fn is_advanced(&self) -> bool {
        !self.win_tiers.is_empty()
    }

    /// Every action this step can fire.
    pub fn actions(&self) -> impl Iterator<Item = &StepAction> {
        self.win_tiers.iter().map(|t| &t.action).chain(self.on_loss.iter())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRATEGY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
    pub initial_bankroll: f64,
    pub target_bankroll: f64,
    pub max_iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_size: Option<f64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub modified_at: i64,
    #[serde(default)]
    pub is_preloaded: bool,
}

impl Strategy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        initial_bankroll: f64,
        target_bankroll: f64,
        max_iterations: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            initial_bankroll,
            target_bankroll,
            max_iterations,
            max_drawdown: None,
            bullet_size: None,
            created_at: 0,
            modified_at: 0,
            is_preloaded: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_max_drawdown(mut self, cap: f64) -> Self {
        self.max_drawdown = Some(cap);
        self
    }

    pub fn with_bullet(mut self, size: f64) -> Self {
        self.bullet_size = Some(size);
        self
    }

    /// Advanced when a bullet is configured or any step has win tiers.
    pub fn is_advanced(&self) -> bool {
        self.bullet_size.is_some() || self.steps.iter().any(Step::is_advanced)
    }

    /// Bullet drawn at the start of each advanced cycle.
    /// Falls back to the initial bankroll.
    pub fn bullet(&self) -> f64 {
        self.bullet_size.unwrap_or(self.initial_bankroll)
    }

    /// Index of the step with the given id
    pub fn step_index(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Every violated rule, in a stable order.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Strategy name is required".to_string());
        }
        if self.steps.is_empty() {
            errors.push("Strategy must have at least one step".to_string());
        }
        if !(self.initial_bankroll > 0.0) {
            errors.push("Initial bankroll must be positive".to_string());
        }
        if !(self.target_bankroll > self.initial_bankroll) {
            errors.push("Target bankroll must be greater than initial bankroll".to_string());
        }
        if self.max_iterations == 0 {
            errors.push("Max iterations must be positive".to_string());
        }
        if self.max_drawdown.is_some_and(|cap| !(cap > 0.0)) {
            errors.push("Max drawdown must be positive when set".to_string());
        }
        if self.bullet_size.is_some_and(|bullet| !(bullet > 0.0)) {
            errors.push("Bullet size must be positive when set".to_string());
        }

        for step in &self.steps {
            if step.bets.is_empty() {
                errors.push(format!("Step \"{}\" must have at least one bet", step.id));
            }
            for bet in &step.bets {
                if let Err(e) = bet.check() {
                    errors.push(format!("Step \"{}\": {}", step.id, e));
                }
            }
        }

        errors
    }

    /// Reject the strategy with every violated rule.
    pub fn validate(&self) -> WhResult<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WhError::InvalidStrategy(errors))
        }
    }

    /// Problems that the engine recovers from at run time.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let advanced = self.is_advanced();

        for step in &self.steps {
            if !advanced && step.bets.iter().any(|b| b.sizing.is_advanced()) {
                warnings.push(format!(
                    "Step \"{}\" uses carry/bullet sizing in a legacy strategy; those bets stake 0",
                    step.id
                ));
            }

            for (label, target) in [("win", &step.next_step_on_win), ("loss", &step.next_step_on_loss)] {
                let Some(id) = target else { continue };
                if self.step_index(id).is_none() {
                    warnings.push(format!(
                        "Step \"{}\" next step on {} \"{}\" does not exist; advancing to the following step",
                        step.id, label, id
                    ));
                }
            }

            for action in step.actions() {
                if action.kind != ActionKind::GotoStep {
                    continue;
                }
                match &action.target_step_id {
                    Some(id) if self.step_index(id).is_some() => {}
                    Some(id) => warnings.push(format!(
                        "Step \"{}\" goes to unknown step \"{}\"; falling back to step 1",
                        step.id, id
                    )),
                    None => warnings.push(format!(
                        "Step \"{}\" has a go-to action without a target; falling back to step 1",
                        step.id
                    )),
                }
            }
        }

        warnings
    }

    /// Stamp creation and modification times.
    pub fn touch(&mut self) {
        let now = now_millis();
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.modified_at = now;
    }
}
