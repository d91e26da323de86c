//! Mana symbols, mana costs, and the per-player mana pool.

use crate::color::Color;

/// A single mana symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManaSymbol {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
    /// Generic mana, payable with any symbol.
    Generic(u32),
}

impl ManaSymbol {
    /// The color of this symbol, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            ManaSymbol::White => Some(Color::White),
            ManaSymbol::Blue => Some(Color::Blue),
            ManaSymbol::Black => Some(Color::Black),
            ManaSymbol::Red => Some(Color::Red),
            ManaSymbol::Green => Some(Color::Green),
            ManaSymbol::Colorless | ManaSymbol::Generic(_) => None,
        }
    }
}

/// A mana cost: colored/colorless pips plus a generic component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaCost {
    /// Non-generic pips that must be paid with matching mana.
    pub pips: Vec<ManaSymbol>,
    /// Generic component, payable with any mana.
    pub generic: u32,
}

impl ManaCost {
    /// A free cost.
    pub fn free() -> Self {
        Self::default()
    }

    /// A purely generic cost, e.g. `{2}`.
    pub fn generic(amount: u32) -> Self {
        Self {
            pips: vec![],
            generic: amount,
        }
    }

    /// Build a cost from symbols; `Generic(n)` symbols fold into the generic component.
    pub fn from_symbols(symbols: &[ManaSymbol]) -> Self {
        let mut cost = Self::free();
        for &symbol in symbols {
            match symbol {
                ManaSymbol::Generic(n) => cost.generic += n,
                pip => cost.pips.push(pip),
            }
        }
        cost
    }

    /// Total number of mana required.
    pub fn converted(&self) -> u32 {
        self.pips.len() as u32 + self.generic
    }

    pub fn is_free(&self) -> bool {
        self.pips.is_empty() && self.generic == 0
    }
}

/// Mana a player currently has available.
///
/// Pips are kept individually so that a payment can be undone symbol by
/// symbol during activation rollback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaPool {
    symbols: Vec<ManaSymbol>,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one symbol to the pool. `Generic(n)` adds n colorless.
    pub fn add(&mut self, symbol: ManaSymbol) {
        match symbol {
            ManaSymbol::Generic(n) => {
                for _ in 0..n {
                    self.symbols.push(ManaSymbol::Colorless);
                }
            }
            pip => self.symbols.push(pip),
        }
    }

    pub fn total(&self) -> u32 {
        self.symbols.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Check whether this pool can cover a cost (non-mutating).
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        self.plan_payment(cost).is_some()
    }

    /// Pay a cost, removing the spent symbols.
    ///
    /// Returns the exact symbols removed so the caller can refund them on
    /// rollback, or `None` (pool untouched) if the cost cannot be covered.
    pub fn pay(&mut self, cost: &ManaCost) -> Option<Vec<ManaSymbol>> {
        let plan = self.plan_payment(cost)?;
        let mut spent = Vec::with_capacity(plan.len());
        // Remove highest indices first so earlier indices stay valid.
        let mut indices = plan;
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for index in indices {
            spent.push(self.symbols.remove(index));
        }
        Some(spent)
    }

    /// Return previously spent symbols to the pool.
    pub fn refund(&mut self, symbols: Vec<ManaSymbol>) {
        self.symbols.extend(symbols);
    }

    /// Empty the pool (end of step/phase).
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Compute which pool indices would pay the cost: exact pips first,
    /// then anything left for the generic component.
    fn plan_payment(&self, cost: &ManaCost) -> Option<Vec<usize>> {
        let mut used = vec![false; self.symbols.len()];
        let mut plan = Vec::new();

        for pip in &cost.pips {
            let index = self
                .symbols
                .iter()
                .enumerate()
                .position(|(i, s)| !used[i] && s == pip)?;
            used[index] = true;
            plan.push(index);
        }

        let mut generic_left = cost.generic;
        for (i, _) in self.symbols.iter().enumerate() {
            if generic_left == 0 {
                break;
            }
            if !used[i] {
                used[i] = true;
                plan.push(i);
                generic_left -= 1;
            }
        }
        if generic_left > 0 {
            return None;
        }
        Some(plan)
    }
}
