//! Word-count goal tracking

use anyhow::{Context, Result};

use crate::store::Store;

/// Key the goal is persisted under
pub const GOAL_KEY: &str = "markdown-editor-word-goal";

/// Progress tier, used to colour the indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalStatus {
    NotSet,
    /// Below 75%
    Started(u8),
    /// 75% and above
    Close(u8),
    Reached,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordGoal {
    target: Option<u32>,
    acknowledged: bool,
}

impl WordGoal {
    /// A goal of `words`; 0 means no goal
    pub fn new(words: u32) -> Self {
        Self {
            target: (words > 0).then_some(words),
            acknowledged: false,
        }
    }

    /// Load the persisted goal; anything unparsable counts as no goal
    pub fn load(store: &dyn Store) -> Result<Self> {
        let stored = store.get(GOAL_KEY).context("Failed to read word goal")?;
        let words = stored
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Ok(Self::new(words))
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Set a new target from user input. Rejects non-numbers and zero.
    pub fn set_from_input(&mut self, input: &str, store: &dyn Store) -> Result<u32> {
        let words = input
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Not a word count: {input:?}"))?;
        if words == 0 {
            anyhow::bail!("Word goal must be greater than zero");
        }
        self.set(words, store)?;
        Ok(words)
    }

    pub fn set(&mut self, words: u32, store: &dyn Store) -> Result<()> {
        if words == 0 {
            return self.clear(store);
        }
        store
            .set(GOAL_KEY, &words.to_string())
            .context("Failed to save word goal")?;
        self.target = Some(words);
        self.acknowledged = false;
        Ok(())
    }

    pub fn clear(&mut self, store: &dyn Store) -> Result<()> {
        store.remove(GOAL_KEY).context("Failed to clear word goal")?;
        self.target = None;
        self.acknowledged = false;
        Ok(())
    }

    /// Percent complete, capped at 100
    pub fn progress(&self, words: usize) -> u8 {
        match self.target {
            None => 0,
            Some(target) => {
                let pct = (words as f64 / target as f64 * 100.0).round();
                pct.min(100.0) as u8
            }
        }
    }

    pub fn status(&self, words: usize) -> GoalStatus {
        if self.target.is_none() {
            return GoalStatus::NotSet;
        }
        match self.progress(words) {
            100 => GoalStatus::Reached,
            pct if pct >= 75 => GoalStatus::Close(pct),
            pct => GoalStatus::Started(pct),
        }
    }

    /// True while the goal is reached and the user has not dismissed it
    pub fn should_celebrate(&self, words: usize) -> bool {
        self.status(words) == GoalStatus::Reached && !self.acknowledged
    }

    /// Dismiss the celebration until the goal changes
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }
}
