use std::ops::Range;

use chrono::NaiveDate;

use crate::model::*;

/// Every claim whose span contains `hour`, reservations first.
pub fn claims_at(occupancy: &Occupancy, hour: Hour) -> Vec<Occupant> {
    let reservations = occupancy
        .reservations
        .iter()
        .filter(|r| r.occupies() && r.span.contains_hour(hour))
        .map(|r| Occupant::Reservation { id: r.id, status: r.status });
    let recurring = occupancy
        .recurring
        .iter()
        .filter(|b| b.occupies() && b.span.contains_hour(hour))
        .map(|b| Occupant::Recurring { id: b.id });
    reservations.chain(recurring).collect()
}

/// Hours in `hours` claimed more than once. Under correct write-side
/// validation this is always empty.
pub fn detect_conflicts(date: NaiveDate, occupancy: &Occupancy, hours: Range<Hour>) -> Vec<OccupancyConflict> {
    hours
        .filter_map(|hour| {
            let claims = claims_at(occupancy, hour);
            (claims.len() > 1).then_some(OccupancyConflict { date, hour, claims })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn date() -> NaiveDate {
        parse_date("2025-03-03").unwrap()
    }

    fn reservation(start: Hour, end: Hour) -> Reservation {
        Reservation::new(Ulid::new(), date(), HourSpan::new(start, end).unwrap(), 1).unwrap()
    }

    fn fixed(start: Hour, end: Hour) -> RecurringBooking {
        RecurringBooking::new(Ulid::new(), DayOfWeek::MONDAY, HourSpan::new(start, end).unwrap())
            .with_status(RecurringStatus::Active)
    }

    #[test]
    fn multi_hour_reservation_claims_each_hour() {
        let occupancy = Occupancy {
            reservations: vec![reservation(18, 20)],
            recurring: vec![],
        };
        assert_eq!(claims_at(&occupancy, 17).len(), 0);
        assert_eq!(claims_at(&occupancy, 18).len(), 1);
        assert_eq!(claims_at(&occupancy, 19).len(), 1);
        assert_eq!(claims_at(&occupancy, 20).len(), 0);
    }

    #[test]
    fn reservation_and_fixed_client_conflict() {
        let r = reservation(17, 19);
        let b = fixed(18, 20);
        let occupancy = Occupancy {
            reservations: vec![r.clone()],
            recurring: vec![b.clone()],
        };
        let conflicts = detect_conflicts(date(), &occupancy, 0..24);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].hour, 18);
        assert_eq!(
            conflicts[0].claims,
            vec![
                Occupant::Reservation { id: r.id, status: ReservationStatus::Pending },
                Occupant::Recurring { id: b.id },
            ]
        );
    }

    #[test]
    fn conflicts_outside_window_ignored() {
        let occupancy = Occupancy {
            reservations: vec![reservation(6, 7)],
            recurring: vec![fixed(6, 7)],
        };
        assert!(detect_conflicts(date(), &occupancy, 7..23).is_empty());
        assert_eq!(detect_conflicts(date(), &occupancy, 0..24).len(), 1);
    }

    #[test]
    fn inactive_claims_do_not_count() {
        let mut cancelled = reservation(9, 10);
        cancelled.status = ReservationStatus::Cancelled;
        let requested = RecurringBooking::new(Ulid::new(), DayOfWeek::MONDAY, HourSpan::new(9, 10).unwrap());
        let occupancy = Occupancy {
            reservations: vec![cancelled, reservation(9, 10)],
            recurring: vec![requested],
        };
        assert_eq!(claims_at(&occupancy, 9).len(), 1);
        assert!(detect_conflicts(date(), &occupancy, 0..24).is_empty());
    }
}
