use crate::side::TeamSide;
use core::ops::{Index, IndexMut};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Derivative, Serialize, Deserialize)]
#[derivative(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeAwayBundle<T> {
    pub home: T,
    pub away: T,
}

impl<T> HomeAwayBundle<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamSide, &T)> {
        self.into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (TeamSide, &mut T)> {
        [
            (TeamSide::Home, &mut self.home),
            (TeamSide::Away, &mut self.away),
        ]
        .into_iter()
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> HomeAwayBundle<U> {
        HomeAwayBundle {
            home: f(&self.home),
            away: f(&self.away),
        }
    }
}

impl<T> Index<TeamSide> for HomeAwayBundle<T> {
    type Output = T;

    fn index(&self, side: TeamSide) -> &Self::Output {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

impl<T> IndexMut<TeamSide> for HomeAwayBundle<T> {
    fn index_mut(&mut self, side: TeamSide) -> &mut Self::Output {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }
}

impl<T: Display> Display for HomeAwayBundle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Home: {}, Away: {}", self.home, self.away)
    }
}

pub struct HomeAwayBundleIterator<'a, T> {
    bundle: &'a HomeAwayBundle<T>,
    index: usize,
}

impl<'a, T> Iterator for HomeAwayBundleIterator<'a, T> {
    type Item = (TeamSide, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let value = match self.index {
            0 => (TeamSide::Home, &self.bundle.home),
            1 => (TeamSide::Away, &self.bundle.away),
            _ => return None,
        };

        self.index += 1;
        Some(value)
    }
}

impl<'a, T> IntoIterator for &'a HomeAwayBundle<T> {
    type Item = (TeamSide, &'a T);
    type IntoIter = HomeAwayBundleIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        HomeAwayBundleIterator {
            bundle: self,
            index: 0,
        }
    }
}

impl<T> IntoIterator for HomeAwayBundle<T> {
    type Item = (TeamSide, T);
    type IntoIter = core::array::IntoIter<Self::Item, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [(TeamSide::Home, self.home), (TeamSide::Away, self.away)].into_iter()
    }
}
