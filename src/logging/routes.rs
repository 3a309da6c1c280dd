//! Routing sets
//!
//! A [`Routes`] value names the destinations a single log call may reach.
//! The dispatcher combines it with a configured floor and ceiling using the
//! explicit set operations below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single log destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Append to the log file
    Save,
    /// Write to the console
    Print,
    /// Append to the in-memory session buffer
    Session,
}

impl Destination {
    pub const ALL: [Destination; 3] = [Destination::Save, Destination::Print, Destination::Session];

    fn bit(self) -> u8 {
        match self {
            Destination::Save => 0b001,
            Destination::Print => 0b010,
            Destination::Session => 0b100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Save => "save",
            Destination::Print => "print",
            Destination::Session => "session",
        }
    }
}

/// Set of destinations
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Destination>", into = "Vec<Destination>")]
pub struct Routes {
    bits: u8,
}

impl Routes {
    pub const NONE: Routes = Routes { bits: 0 };
    pub const SAVE: Routes = Routes { bits: 0b001 };
    pub const PRINT: Routes = Routes { bits: 0b010 };
    pub const SESSION: Routes = Routes { bits: 0b100 };
    pub const SAVE_PRINT: Routes = Routes { bits: 0b011 };
    pub const SAVE_SESSION: Routes = Routes { bits: 0b101 };
    pub const PRINT_SESSION: Routes = Routes { bits: 0b110 };
    pub const ALL: Routes = Routes { bits: 0b111 };

    /// Build a set from individual destinations
    pub fn of(destinations: &[Destination]) -> Self {
        destinations
            .iter()
            .fold(Routes::NONE, |acc, d| acc.with(*d))
    }

    /// Copy of this set with `destination` added
    pub fn with(self, destination: Destination) -> Self {
        Routes {
            bits: self.bits | destination.bit(),
        }
    }

    pub fn union(self, other: Routes) -> Self {
        Routes {
            bits: self.bits | other.bits,
        }
    }

    pub fn intersection(self, other: Routes) -> Self {
        Routes {
            bits: self.bits & other.bits,
        }
    }

    pub fn contains(&self, destination: Destination) -> bool {
        self.bits & destination.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Destinations in this set, in save/print/session order
    pub fn destinations(&self) -> Vec<Destination> {
        Destination::ALL
            .iter()
            .copied()
            .filter(|d| self.contains(*d))
            .collect()
    }
}

impl From<Destination> for Routes {
    fn from(destination: Destination) -> Self {
        Routes::NONE.with(destination)
    }
}

impl From<Vec<Destination>> for Routes {
    fn from(destinations: Vec<Destination>) -> Self {
        Routes::of(&destinations)
    }
}

impl From<Routes> for Vec<Destination> {
    fn from(routes: Routes) -> Self {
        routes.destinations()
    }
}

impl fmt::Debug for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.destinations()).finish()
    }
}

impl fmt::Display for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.destinations().iter().map(|d| d.as_str()).collect();
        f.write_str(&names.join("|"))
    }
}
