//! Command-line logger
use super::{Event, LogError, Loggable, Logger};
use enum_map::{enum_map, EnumMap};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::ops::Drop;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that writes periodic summaries to stdout.
///
/// Values are aggregated per event: scalars by their mean, index samples by their empirical
/// distribution and messages by their counts.
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,

    average_between_displays: bool,
}

impl CLILogger {
    pub fn new(display_period: Duration, average_between_displays: bool) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
            average_between_displays,
        }
    }

    /// Display the summary and clear all stored data.
    pub fn display(&mut self) {
        let stdout = io::stdout();
        // Nothing sensible to do if stdout is gone.
        let _ = self.write_summary(&mut stdout.lock());
        self.last_display_time = Instant::now();
    }

    /// Write the summary since the last display and clear the aggregated values.
    pub fn write_summary<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        for (event, event_log) in self.events.iter_mut() {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }

            let heading = if self.average_between_displays {
                format!(
                    "{:?}s {} - {}",
                    event,
                    event_log.summary_start_index,
                    event_log.index - 1
                )
            } else {
                format!("{:?} {}", event, event_log.index - 1)
            };
            let per_event = per_event_duration(event_log.summary_duration, summary_size);
            writeln!(
                out,
                "==== {} ({:?} / event) ====",
                Paint::cyan(heading).bold(),
                per_event
            )?;

            for (name, aggregator) in &mut event_log.aggregators {
                writeln!(out, "{}: {}", name, aggregator)?;
                aggregator.clear()
            }
            event_log.summary_start_index = event_log.index;
        }
        Ok(())
    }
}

/// Mean duration of each of `count` events; `count` must be positive.
fn per_event_duration(total: Duration, count: u64) -> Duration {
    total / u32::try_from(count).unwrap_or(u32::MAX)
}

impl Logger for CLILogger {
    fn log<'a>(
        &mut self,
        event: Event,
        name: &'a str,
        value: Loggable,
    ) -> Result<(), LogError<'a>> {
        let aggregators = &mut self.events[event].aggregators;
        if let Some(aggregator) = aggregators.get_mut(name) {
            if let Err((value, expected)) = aggregator.update(value) {
                return Err(LogError::new(name, value, expected));
            }
        } else {
            aggregators.insert(name.into(), Aggregator::new(value));
        }
        Ok(())
    }

    fn done(&mut self, event: Event) {
        let event_info = &mut self.events[event];
        event_info.index += 1;

        for aggregator in event_info.aggregators.values_mut() {
            aggregator.commit()
        }

        let time_since_display = self.last_display_time.elapsed();
        event_info.summary_duration = time_since_display;
        if time_since_display < self.display_period {
            return;
        }

        self.display();
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Ensure everything is flushed.
        self.display();
    }
}

struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    /// Duration of this summary period to the most recent update
    summary_duration: Duration,
    /// An aggregator for each log entry.
    aggregators: BTreeMap<String, Aggregator>,
}

impl EventLog {
    #[allow(clippy::missing_const_for_fn)] // BTreeMap const new not stabilized
    fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            summary_duration: Duration::new(0, 0),
            aggregators: BTreeMap::new(),
        }
    }
}

/// Aggregates the values logged under one name.
///
/// A value logged during an event stays pending until the event is done.
#[derive(Debug)]
enum Aggregator {
    /// Aggregates nothing
    Nothing,
    ScalarMean {
        sum: f64,
        count: u64,
        pending: Option<f64>,
    },
    IndexDistribution {
        counts: Vec<u64>,
        pending: Option<usize>,
    },
    MessageCounts {
        counts: BTreeMap<Cow<'static, str>, usize>,
        pending: Option<Cow<'static, str>>,
    },
}
use Aggregator::*;

impl Aggregator {
    /// Create a new aggregator from a logged value.
    fn new(value: Loggable) -> Self {
        match value {
            Loggable::Nothing => Nothing,
            Loggable::Scalar(x) => ScalarMean {
                sum: 0.0,
                count: 0,
                pending: Some(x),
            },
            Loggable::IndexSample { value, size } => IndexDistribution {
                counts: vec![0; size],
                pending: Some(value),
            },
            Loggable::Message(message) => MessageCounts {
                counts: BTreeMap::new(),
                pending: Some(message),
            },
        }
    }

    /// Update an aggregator with a logged value within an event.
    ///
    /// Returns Err((value, expected)) if the value is incompatible with this aggregator.
    fn update(&mut self, value: Loggable) -> Result<(), (Loggable, String)> {
        match (self, value) {
            (Nothing, Loggable::Nothing) => {}
            (ScalarMean { pending, .. }, Loggable::Scalar(x)) => *pending = Some(x),
            (IndexDistribution { counts, pending }, Loggable::IndexSample { value, size })
                if counts.len() == size && value < size =>
            {
                *pending = Some(value)
            }
            (MessageCounts { pending, .. }, Loggable::Message(message)) => {
                *pending = Some(message)
            }
            (aggregator, value) => return Err((value, aggregator.expected())),
        }
        Ok(())
    }

    /// Description of the values this aggregator accepts.
    fn expected(&self) -> String {
        match self {
            Nothing => "Nothing".into(),
            ScalarMean { .. } => "Scalar".into(),
            IndexDistribution { counts, .. } => format!("IndexSample{{size: {}}}", counts.len()),
            MessageCounts { .. } => "Message".into(),
        }
    }

    /// Commit the pending value into the aggregate.
    fn commit(&mut self) {
        match self {
            Nothing => {}
            ScalarMean {
                sum,
                count,
                pending,
            } => {
                if let Some(x) = pending.take() {
                    *sum += x;
                    *count += 1;
                }
            }
            IndexDistribution { counts, pending } => {
                if let Some(value) = pending.take() {
                    if let Some(count) = counts.get_mut(value) {
                        *count += 1;
                    }
                }
            }
            MessageCounts { counts, pending } => {
                if let Some(message) = pending.take() {
                    *counts.entry(message).or_insert(0) += 1;
                }
            }
        }
    }

    /// Clear the aggregated values (but not the pending values)
    fn clear(&mut self) {
        match self {
            Nothing => {}
            ScalarMean { sum, count, .. } => {
                *sum = 0.0;
                *count = 0;
            }
            IndexDistribution { counts, .. } => counts.iter_mut().for_each(|c| *c = 0),
            MessageCounts { counts, .. } => counts.clear(),
        }
    }
}

/// Display the commited aggregated value.
impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Nothing => write!(f, "Nothing"),
            ScalarMean { sum, count, .. } => write!(f, "{}", sum / (*count as f64)),
            IndexDistribution { counts, .. } => {
                let total: u64 = counts.iter().sum();
                if total == 0 {
                    return write!(f, "None");
                }
                write!(f, "[")?;
                for (i, c) in counts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:.3}", (*c as f64) / (total as f64))?;
                }
                write!(f, "]")
            }
            MessageCounts { counts, .. } => {
                if counts.len() == 1 {
                    for (message, count) in counts {
                        write!(f, "[x{}] {}", count, message)?;
                    }
                } else {
                    for (message, count) in counts {
                        write!(f, "\n\t[x{}] {}", count, message)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(logger: &mut CLILogger) -> String {
        let mut out = Vec::new();
        logger.write_summary(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// A logger that never displays on its own.
    fn quiet_logger() -> CLILogger {
        CLILogger::new(Duration::from_secs(3600), true)
    }

    #[test]
    fn scalar_mean() {
        let mut logger = quiet_logger();
        for x in [1.0, 2.0, 6.0] {
            logger.log(Event::Step, "reward", Loggable::Scalar(x)).unwrap();
            logger.done(Event::Step);
        }
        let text = summary(&mut logger);
        assert!(text.contains("reward: 3"), "{}", text);
        assert!(text.contains("Steps 0 - 2"), "{}", text);
    }

    #[test]
    fn index_distribution() {
        let mut logger = quiet_logger();
        for value in [0, 1, 1, 1] {
            logger
                .log(Event::Step, "action", Loggable::IndexSample { value, size: 2 })
                .unwrap();
            logger.done(Event::Step);
        }
        let text = summary(&mut logger);
        assert!(text.contains("action: [0.250, 0.750]"), "{}", text);
    }

    #[test]
    fn message_counts() {
        let mut logger = quiet_logger();
        for message in ["explore", "explore"] {
            logger.log(Event::Episode, "note", message.into()).unwrap();
            logger.done(Event::Episode);
        }
        let text = summary(&mut logger);
        assert!(text.contains("note: [x2] explore"), "{}", text);
    }

    #[test]
    fn incompatible_value() {
        let mut logger = quiet_logger();
        logger.log(Event::Step, "reward", Loggable::Scalar(1.0)).unwrap();
        let err = logger
            .log(Event::Step, "reward", Loggable::IndexSample { value: 0, size: 2 })
            .unwrap_err();
        assert!(err.to_string().contains("expected Scalar"));
    }

    #[test]
    fn summary_clears_values() {
        let mut logger = quiet_logger();
        logger.log(Event::Step, "reward", Loggable::Scalar(1.0)).unwrap();
        logger.done(Event::Step);
        summary(&mut logger);
        let text = summary(&mut logger);
        assert!(!text.contains("reward"), "{}", text);
    }

    #[test]
    fn per_event_duration_saturates() {
        let total = Duration::from_secs(8);
        assert_eq!(per_event_duration(total, 4), Duration::from_secs(2));
        // Counts beyond u32 saturate instead of wrapping to zero.
        assert_eq!(
            per_event_duration(total, 1 << 32),
            total / u32::MAX
        );
        assert_eq!(
            per_event_duration(total, u64::MAX),
            total / u32::MAX
        );
    }

    #[test]
    fn events_are_separate() {
        let mut logger = quiet_logger();
        logger.log(Event::Step, "x", Loggable::Scalar(1.0)).unwrap();
        logger.log(Event::Episode, "x", Loggable::Nothing).unwrap();
        logger.done(Event::Step);
        logger.done(Event::Episode);
        let text = summary(&mut logger);
        assert!(text.contains("x: 1"), "{}", text);
        assert!(text.contains("x: Nothing"), "{}", text);
    }
}
