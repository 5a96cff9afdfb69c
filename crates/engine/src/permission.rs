use std::fmt;

/// Capability tier of a user on a budget.
///
/// The wire values are powers of two but they are **levels**, not flags:
/// gating compares raw magnitudes (`level >= Update`), so `Owner` implies
/// everything `Admin` can do and so on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i64)]
pub enum PermissionLevel {
    #[default]
    None = 0,
    View = 1,
    Update = 2,
    Admin = 4,
    Owner = 8,
}

impl PermissionLevel {
    /// Maps a raw server value onto the highest level not exceeding it.
    ///
    /// Values between two levels (e.g. `3`) round down, values above `8`
    /// saturate at `Owner` and negative values map to `None`.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            i64::MIN..=0 => Self::None,
            1 => Self::View,
            2..=3 => Self::Update,
            4..=7 => Self::Admin,
            _ => Self::Owner,
        }
    }

    #[must_use]
    pub const fn raw(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub fn can_view(self) -> bool {
        self >= Self::View
    }

    /// Adding and editing categories or expenses.
    #[must_use]
    pub fn can_update(self) -> bool {
        self >= Self::Update
    }

    /// Deleting categories, expenses and budgets.
    #[must_use]
    pub fn can_admin(self) -> bool {
        self >= Self::Admin
    }

    /// Human readable role shown next to a budget.
    #[must_use]
    pub fn role(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::View => "viewer",
            Self::Update => "editor",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl From<i64> for PermissionLevel {
    fn from(value: i64) -> Self {
        Self::from_raw(value)
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}
