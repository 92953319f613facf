//! Per-airline flight ledgers and the book of all airlines in a batch.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::delay::{TimeOfDay, delay};
use crate::error::ParseError;
use crate::parser::TakeOffRecord;
use crate::rating::{Rating, rate};

/// One observed take-off of a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelayRecord {
    pub date: String,
    pub scheduled_time: TimeOfDay,
    pub delay_minutes: i32,
}

/// All take-offs recorded for a single flight code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightLog {
    pub code: String,
    /// Destination as given by the first record of this flight.
    pub destination: String,
    pub records: Vec<DelayRecord>,
}

impl FlightLog {
    fn delays(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|r| r.delay_minutes)
    }
}

/// An airline and the ledger of its flights.
///
/// Flights are kept in the order their codes were first seen.
#[derive(Debug, Clone, Default)]
pub struct Airline {
    name: String,
    code: String,
    flights: Vec<FlightLog>,
    flights_index: HashMap<String, usize>,
}

impl Airline {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Airline {
            name: name.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Two-letter carrier prefix.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Files one take-off under `flight_code`.
    ///
    /// The destination is only stored the first time a code is seen.
    ///
    /// # Errors
    ///
    /// Fails on an empty flight code or an unparseable time. The ledger is
    /// left untouched in both cases.
    pub fn add_record(
        &mut self,
        flight_code: &str,
        date: &str,
        scheduled: &str,
        actual: &str,
        destination: &str,
    ) -> Result<(), ParseError> {
        if flight_code.is_empty() {
            return Err(ParseError::EmptyFlightCode);
        }

        let scheduled_time: TimeOfDay = scheduled.parse()?;
        let actual_time: TimeOfDay = actual.parse()?;
        let record = DelayRecord {
            date: date.to_string(),
            scheduled_time,
            delay_minutes: delay(scheduled_time, actual_time),
        };

        let idx = match self.flights_index.get(flight_code) {
            Some(idx) => *idx,
            None => {
                self.flights.push(FlightLog {
                    code: flight_code.to_string(),
                    destination: destination.to_string(),
                    records: Vec::new(),
                });
                let idx = self.flights.len() - 1;
                self.flights_index.insert(flight_code.to_string(), idx);
                idx
            }
        };

        let flight = &mut self.flights[idx];
        if flight.destination != destination {
            debug!(
                flight = flight_code,
                kept = %flight.destination,
                ignored = destination,
                "Conflicting destination"
            );
        }
        flight.records.push(record);

        Ok(())
    }

    /// Files a parsed take-off record.
    ///
    /// # Errors
    ///
    /// See [`Airline::add_record`].
    pub fn add_take_off(&mut self, record: &TakeOffRecord) -> Result<(), ParseError> {
        self.add_record(
            &record.code,
            &record.date,
            &record.time,
            &record.take_off,
            &record.destination,
        )
    }

    fn flight(&self, flight_code: &str) -> Option<&FlightLog> {
        self.flights_index.get(flight_code).map(|i| &self.flights[*i])
    }

    pub fn flights(&self) -> &[FlightLog] {
        &self.flights
    }

    pub fn flight_codes(&self) -> impl Iterator<Item = &str> {
        self.flights.iter().map(|f| f.code.as_str())
    }

    pub fn records(&self, flight_code: &str) -> Option<&[DelayRecord]> {
        self.flight(flight_code).map(|f| f.records.as_slice())
    }

    pub fn destination(&self, flight_code: &str) -> Option<&str> {
        self.flight(flight_code).map(|f| f.destination.as_str())
    }

    /// Number of take-offs across all flights.
    pub fn record_count(&self) -> usize {
        self.flights.iter().map(|f| f.records.len()).sum()
    }

    /// Rating of a single flight, `None` if the code is unknown.
    pub fn rate_flight(&self, flight_code: &str) -> Option<Rating> {
        self.flight(flight_code).and_then(|f| rate(f.delays()))
    }

    /// Rating over every take-off of every flight of this airline.
    ///
    /// Counts are pooled across flights before dividing, so the result is
    /// not a mean of the already truncated per-flight ratings.
    pub fn rate_airline(&self) -> Option<Rating> {
        rate(self.flights.iter().flat_map(FlightLog::delays))
    }
}

/// All airlines of a batch, keyed by name and kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AirlineBook {
    airlines: Vec<Airline>,
    airlines_index: HashMap<String, usize>,
}

impl AirlineBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the book from a batch of records.
    ///
    /// Records the ledger rejects are logged and skipped; their count is
    /// returned alongside the book.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn from_records(records: &[TakeOffRecord]) -> (Self, usize) {
        let mut book = AirlineBook::new();
        let mut skipped = 0;

        for record in records {
            if let Err(e) = book.ingest(record) {
                warn!(
                    error = %e,
                    code = %record.code,
                    date = %record.date,
                    "Skipping record"
                );
                skipped += 1;
            }
        }

        info!(
            airlines = book.len(),
            skipped,
            "Airline ledgers built"
        );
        (book, skipped)
    }

    /// Files `record` under its airline, creating the airline on first
    /// sighting with the first two characters of the flight code as its
    /// carrier code.
    ///
    /// # Errors
    ///
    /// See [`Airline::add_record`]. An airline is not created for a
    /// rejected record.
    pub fn ingest(&mut self, record: &TakeOffRecord) -> Result<(), ParseError> {
        if let Some(idx) = self.airlines_index.get(&record.airline) {
            return self.airlines[*idx].add_take_off(record);
        }

        let carrier: String = record.code.chars().take(2).collect();
        let mut airline = Airline::new(&record.airline, carrier);
        airline.add_take_off(record)?;

        self.airlines_index
            .insert(record.airline.clone(), self.airlines.len());
        self.airlines.push(airline);
        Ok(())
    }

    /// Adds an airline as is. An airline with the same name is replaced in
    /// place, keeping its position.
    pub fn insert(&mut self, airline: Airline) {
        match self.airlines_index.get(airline.name()) {
            Some(idx) => self.airlines[*idx] = airline,
            None => {
                self.airlines_index
                    .insert(airline.name().to_string(), self.airlines.len());
                self.airlines.push(airline);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Airline> {
        self.airlines_index.get(name).map(|i| &self.airlines[*i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Airline> {
        self.airlines.iter()
    }

    pub fn len(&self) -> usize {
        self.airlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airlines.is_empty()
    }
}

impl<'a> IntoIterator for &'a AirlineBook {
    type Item = &'a Airline;
    type IntoIter = std::slice::Iter<'a, Airline>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
