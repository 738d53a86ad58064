use super::evolution_engine::{GenerationSummary, ProgressCallback};
use super::population::Population;
use crate::data::save_population;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

impl ProgressCallback for () {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _summary: &GenerationSummary, _population: &Population) {}
}

/// Runs both callbacks, first then second.
impl<A: ProgressCallback, B: ProgressCallback> ProgressCallback for (A, B) {
    fn on_generation_start(&mut self, generation: usize) {
        self.0.on_generation_start(generation);
        self.1.on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary, population: &Population) {
        self.0.on_generation_complete(summary, population);
        self.1.on_generation_complete(summary, population);
    }
}

/// Prints the top of the ranked population every `interval` generations.
pub struct LoggingProgress {
    interval: usize,
    top: usize,
}

impl LoggingProgress {
    pub fn new(interval: usize, top: usize) -> Self {
        Self {
            interval: interval.max(1),
            top,
        }
    }
}

impl Default for LoggingProgress {
    fn default() -> Self {
        Self::new(10, 3)
    }
}

impl ProgressCallback for LoggingProgress {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary, population: &Population) {
        if summary.generation % self.interval != 0 {
            return;
        }
        for (rank, record) in population.records().iter().take(self.top).enumerate() {
            log::info!(
                "  #{} {} {}",
                rank + 1,
                record.rank_key(),
                record.chromosome.encode()
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationSummary),
}

/// Forwards progress to another thread. A dropped receiver is ignored.
pub struct ChannelProgress {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgress {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary, _population: &Population) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(summary.clone()));
    }
}

/// Rewrites a population file after every generation so an interrupted run
/// can be resumed with it. Write failures are logged and the run goes on.
pub struct PopulationAutosave {
    path: PathBuf,
}

impl PopulationAutosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProgressCallback for PopulationAutosave {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, summary: &GenerationSummary, population: &Population) {
        if let Err(e) = save_population(&self.path, population.chromosomes()) {
            log::warn!(
                "Failed to autosave generation {} to {}: {}",
                summary.generation,
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::data::load_population;
    use crate::engines::generation::{Chromosome, FitnessRecord};
    use crate::types::{Cost, Fitness};
    use std::sync::mpsc;

    fn catalog() -> Catalog {
        Catalog::from_abbreviations(&[("A", 'a'), ("B", 'b')]).unwrap()
    }

    fn summary(generation: usize) -> GenerationSummary {
        GenerationSummary {
            generation,
            best: Some(Fitness::Cost(Cost(1))),
            best_chromosome: "a".to_string(),
            best_so_far: Some(Fitness::Cost(Cost(1))),
            mean_cost: Some(1.5),
            failed: 0,
            evaluations: 2,
            stagnation: 0,
        }
    }

    fn population(catalog: &Catalog) -> Population {
        Population::new(vec![
            FitnessRecord::evaluated(
                Chromosome::decode(catalog, "a").unwrap(),
                Fitness::Cost(Cost(1)),
            ),
            FitnessRecord::evaluated(
                Chromosome::decode(catalog, "ab").unwrap(),
                Fitness::Cost(Cost(2)),
            ),
        ])
    }

    #[test]
    fn test_channel_forwards_in_order() {
        let catalog = catalog();
        let (sender, receiver) = mpsc::channel();
        let mut progress = ChannelProgress::new(sender);

        progress.on_generation_start(0);
        progress.on_generation_complete(&summary(0), &population(&catalog));
        drop(progress);

        let messages: Vec<ProgressMessage> = receiver.iter().collect();
        assert_eq!(
            messages,
            vec![
                ProgressMessage::GenerationStart(0),
                ProgressMessage::GenerationComplete(summary(0)),
            ]
        );
    }

    #[test]
    fn test_channel_ignores_closed_receiver() {
        let catalog = catalog();
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        let mut progress = ChannelProgress::new(sender);
        progress.on_generation_complete(&summary(3), &population(&catalog));
    }

    #[test]
    fn test_autosave_writes_loadable_file() {
        let catalog = catalog();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.txt");
        let mut autosave = PopulationAutosave::new(&path);

        autosave.on_generation_complete(&summary(0), &population(&catalog));

        let loaded = load_population(&path, &catalog).unwrap();
        let encoded: Vec<String> = loaded.iter().map(Chromosome::encode).collect();
        assert_eq!(encoded, vec!["a", "ab"]);
    }

    #[test]
    fn test_autosave_failure_does_not_panic() {
        let catalog = catalog();
        let dir = tempfile::tempdir().unwrap();
        let mut autosave = PopulationAutosave::new(dir.path().join("missing").join("population.txt"));
        autosave.on_generation_complete(&summary(0), &population(&catalog));
    }

    #[test]
    fn test_pair_runs_both() {
        let catalog = catalog();
        let (first_tx, first_rx) = mpsc::channel();
        let (second_tx, second_rx) = mpsc::channel();
        let mut pair = (ChannelProgress::new(first_tx), ChannelProgress::new(second_tx));

        pair.on_generation_start(4);
        pair.on_generation_complete(&summary(4), &population(&catalog));

        assert_eq!(first_rx.try_iter().count(), 2);
        assert_eq!(second_rx.try_iter().count(), 2);
    }
}
