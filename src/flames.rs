use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FlameError {
    #[error("candle index {index} out of range (have {len} candles)")]
    OutOfRange { index: usize, len: usize },
}

/// Result of blowing on one candle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Extinguish {
    pub(crate) already_out: bool,
    pub(crate) all_now_out: bool,
}

/// Which candles still burn. Entries only ever go lit -> out.
#[derive(Clone, Debug)]
pub(crate) struct FlameStore {
    states: Vec<bool>,
}

impl FlameStore {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            states: vec![true; count],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn is_lit(&self, index: usize) -> bool {
        self.states.get(index).copied().unwrap_or(false)
    }

    pub(crate) fn lit_indices(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, &lit)| lit.then_some(i))
            .collect()
    }

    pub(crate) fn lit_count(&self) -> usize {
        self.states.iter().filter(|&&lit| lit).count()
    }

    pub(crate) fn all_out(&self) -> bool {
        self.states.iter().all(|&lit| !lit)
    }

    pub(crate) fn extinguish(&mut self, index: usize) -> Result<Extinguish, FlameError> {
        let len = self.states.len();
        let slot = self
            .states
            .get_mut(index)
            .ok_or(FlameError::OutOfRange { index, len })?;

        if !*slot {
            return Ok(Extinguish {
                already_out: true,
                all_now_out: self.all_out(),
            });
        }

        // flip before evaluating, or the last candle is never counted
        *slot = false;
        Ok(Extinguish {
            already_out: false,
            all_now_out: self.all_out(),
        })
    }
}
