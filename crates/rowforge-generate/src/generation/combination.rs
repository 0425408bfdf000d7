//! Strategies for combining independent bag streams into rows.

use crate::generation::databags::{DataBag, DataBagIterator};

/// Joins one bag stream per field (or per partition) into a stream of
/// rows spanning all of them. Input streams must cover disjoint fields.
pub trait CombinationStrategy {
    fn permute(&self, streams: Vec<DataBagIterator>) -> DataBagIterator;
}

/// Full cartesian product of the input streams.
///
/// Streams are materialized on demand into caches so the product can be
/// replayed across odometer positions; pulling stays lazy, so a row cap
/// downstream bounds the work.
#[derive(Debug, Default)]
pub struct ExhaustiveCombinationStrategy;

impl ExhaustiveCombinationStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl CombinationStrategy for ExhaustiveCombinationStrategy {
    fn permute(&self, streams: Vec<DataBagIterator>) -> DataBagIterator {
        if streams.is_empty() {
            return Box::new(std::iter::empty());
        }
        let cached = streams
            .into_iter()
            .map(|source| CachedStream {
                source,
                cache: Vec::new(),
                complete: false,
            })
            .collect::<Vec<_>>();
        let indices = vec![0; cached.len()];
        Box::new(ExhaustiveIter {
            streams: cached,
            indices,
            done: false,
        })
    }
}

/// One row per position: every stream contributes its current value,
/// exhausted streams repeat their last one. Ends when no stream can
/// advance; yields nothing if any stream starts empty.
#[derive(Debug, Default)]
pub struct MinimalCombinationStrategy;

impl MinimalCombinationStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl CombinationStrategy for MinimalCombinationStrategy {
    fn permute(&self, streams: Vec<DataBagIterator>) -> DataBagIterator {
        if streams.is_empty() {
            return Box::new(std::iter::empty());
        }
        Box::new(MinimalIter {
            streams,
            current: None,
            done: false,
        })
    }
}

struct CachedStream {
    source: DataBagIterator,
    cache: Vec<DataBag>,
    complete: bool,
}

impl CachedStream {
    fn get(&mut self, index: usize) -> Option<&DataBag> {
        while !self.complete && self.cache.len() <= index {
            match self.source.next() {
                Some(bag) => self.cache.push(bag),
                None => self.complete = true,
            }
        }
        self.cache.get(index)
    }
}

struct ExhaustiveIter {
    streams: Vec<CachedStream>,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for ExhaustiveIter {
    type Item = DataBag;

    fn next(&mut self) -> Option<DataBag> {
        if self.done {
            return None;
        }
        let mut row = DataBag::empty();
        for (stream, &index) in self.streams.iter_mut().zip(&self.indices) {
            match stream.get(index) {
                Some(bag) => row = DataBag::merge(&row, bag),
                None => {
                    // Only reachable when a stream is empty outright.
                    self.done = true;
                    return None;
                }
            }
        }
        let mut position = self.indices.len();
        loop {
            if position == 0 {
                self.done = true;
                break;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.streams[position].get(self.indices[position]).is_some() {
                break;
            }
            self.indices[position] = 0;
        }
        Some(row)
    }
}

struct MinimalIter {
    streams: Vec<DataBagIterator>,
    current: Option<Vec<DataBag>>,
    done: bool,
}

impl Iterator for MinimalIter {
    type Item = DataBag;

    fn next(&mut self) -> Option<DataBag> {
        if self.done {
            return None;
        }
        match &mut self.current {
            None => {
                let mut first = Vec::with_capacity(self.streams.len());
                for stream in &mut self.streams {
                    match stream.next() {
                        Some(bag) => first.push(bag),
                        None => {
                            self.done = true;
                            return None;
                        }
                    }
                }
                let row = combine(&first);
                self.current = Some(first);
                Some(row)
            }
            Some(current) => {
                let mut advanced = false;
                for (index, stream) in self.streams.iter_mut().enumerate() {
                    if let Some(bag) = stream.next() {
                        current[index] = bag;
                        advanced = true;
                    }
                }
                if !advanced {
                    self.done = true;
                    return None;
                }
                Some(combine(current))
            }
        }
    }
}

fn combine(bags: &[DataBag]) -> DataBag {
    bags.iter()
        .fold(DataBag::empty(), |row, bag| DataBag::merge(&row, bag))
}
