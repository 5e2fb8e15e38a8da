use soroban_sdk::contracttype;

/// Signed-magnitude net balance: a non-negative magnitude plus a
/// direction flag instead of a signed integer. `owed = true` means the
/// member is owed money by the group.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Balance {
    pub magnitude: i128,
    pub owed: bool,
}

impl Balance {
    pub fn zero() -> Self {
        Balance {
            magnitude: 0,
            owed: true,
        }
    }

    /// Add money owed to the member. An existing debt is netted first;
    /// the direction flips only when the credit exceeds the debt.
    pub fn credit(&mut self, amount: i128) {
        if self.owed {
            self.magnitude += amount;
        } else if amount >= self.magnitude {
            self.magnitude = amount - self.magnitude;
            self.owed = true;
        } else {
            self.magnitude -= amount;
        }
    }

    /// Add money the member owes; the symmetric update to `credit`.
    pub fn debit(&mut self, amount: i128) {
        if !self.owed {
            self.magnitude += amount;
        } else if amount > self.magnitude {
            self.magnitude = amount - self.magnitude;
            self.owed = false;
        } else {
            self.magnitude -= amount;
        }
    }

    /// Balance as a plain signed value, for invariant checks.
    pub fn signed(&self) -> i128 {
        if self.owed {
            self.magnitude
        } else {
            -self.magnitude
        }
    }
}
