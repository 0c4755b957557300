//! The two fixed player slots of a match

use std::fmt;
use std::ops::{Index, IndexMut};

/// Player slot, assigned in join order and never changed afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    Home,
    Away,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::Home, Seat::Away];

    pub fn opponent(self) -> Self {
        match self {
            Seat::Home => Seat::Away,
            Seat::Away => Seat::Home,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::Home => "home",
            Seat::Away => "away",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per seat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pair<T> {
    pub home: T,
    pub away: T,
}

impl<T> Pair<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    pub fn get(&self, seat: Seat) -> &T {
        match seat {
            Seat::Home => &self.home,
            Seat::Away => &self.away,
        }
    }

    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        match seat {
            Seat::Home => &mut self.home,
            Seat::Away => &mut self.away,
        }
    }

    /// Borrow the value at `seat` and its opponent's at the same time
    pub fn split_mut(&mut self, seat: Seat) -> (&mut T, &mut T) {
        match seat {
            Seat::Home => (&mut self.home, &mut self.away),
            Seat::Away => (&mut self.away, &mut self.home),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Seat, T) -> U) -> Pair<U> {
        Pair {
            home: f(Seat::Home, self.home),
            away: f(Seat::Away, self.away),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        [(Seat::Home, &self.home), (Seat::Away, &self.away)].into_iter()
    }
}

impl<T> Index<Seat> for Pair<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        self.get(seat)
    }
}

impl<T> IndexMut<Seat> for Pair<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        self.get_mut(seat)
    }
}
