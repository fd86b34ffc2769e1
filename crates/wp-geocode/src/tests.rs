//! Unit tests for wp-geocode.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use wp_core::Coordinate;

use crate::{AddressRecord, GeocodeError, GeocodeResult, Geocoder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rec(address: &str) -> AddressRecord {
    AddressRecord::new(address, format!("name of {address}"), format!("LN-{address}"))
}

/// Resolves every address to a fixed point, except the ones listed in
/// `fail`, and counts calls.
struct CountingGeocoder {
    fail:  Vec<&'static str>,
    calls: AtomicUsize,
    seen:  Mutex<Vec<String>>,
}

impl CountingGeocoder {
    fn failing_on(fail: Vec<&'static str>) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
            seen:  Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for CountingGeocoder {
    fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(address.to_owned());
        if self.fail.iter().any(|f| *f == address) {
            return Err(GeocodeError::Service(format!("boom on {address}")));
        }
        let n = address.len() as f64;
        Ok(vec![Coordinate::new(n, n), Coordinate::new(-n, -n)])
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod record {
    use crate::{load_records_csv, load_records_json, AddressRecord};

    #[test]
    fn json_wire_names() {
        let json = r#"[
            {"pickupaddress1": "1 Main St", "customername": "A. Rao", "loancardaccountno": "LN-1"},
            {"pickupAddress": "2 High St", "customerName": "B. Sen", "loanAccountNo": "LN-2"}
        ]"#;
        let records = load_records_json(json.as_bytes()).unwrap();
        assert_eq!(
            records,
            vec![
                AddressRecord::new("1 Main St", "A. Rao", "LN-1"),
                AddressRecord::new("2 High St", "B. Sen", "LN-2"),
            ]
        );
    }

    #[test]
    fn json_lenient_fields() {
        let json = r#"[
            {"pickupaddress1": "1 Main St", "customername": null, "loancardaccountno": 90017},
            {"customername": "No Address"}
        ]"#;
        let records = load_records_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer_name, "");
        assert_eq!(records[0].loan_account_no, "90017");
        assert_eq!(records[1].pickup_address, "");
    }

    #[test]
    fn json_not_an_array_is_decode_error() {
        let result = load_records_json(r#"{"oops": true}"#.as_bytes());
        assert!(matches!(result, Err(crate::FetchError::Decode(_))));
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_string(&AddressRecord::new("a", "b", "c")).unwrap();
        assert_eq!(json, r#"{"pickupaddress1":"a","customername":"b","loancardaccountno":"c"}"#);
    }

    #[test]
    fn csv_keeps_leading_zeros() {
        let csv = "pickupaddress1,customername,loancardaccountno\n\
                   \"1 Main St, Leeds\",A. Rao,000123\n\
                   2 High St,,\n";
        let records = load_records_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pickup_address, "1 Main St, Leeds");
        assert_eq!(records[0].loan_account_no, "000123");
        assert_eq!(records[1].customer_name, "");
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod source {
    use std::io::Cursor;

    use crate::{fetch_records_or_empty, FetchError, FetchResult, JsonRecordSource, RecordSource};
    use crate::AddressRecord;

    struct Unreachable;

    impl RecordSource for Unreachable {
        fn fetch(&self) -> FetchResult<Vec<AddressRecord>> {
            Err(FetchError::Status(503))
        }
    }

    #[test]
    fn failure_degrades_to_empty() {
        assert!(fetch_records_or_empty(&Unreachable).is_empty());
    }

    #[test]
    fn json_source_from_reader_can_fetch_twice() {
        let src = JsonRecordSource::from_reader(Cursor::new(
            r#"[{"pickupaddress1": "x", "customername": "y", "loancardaccountno": "z"}]"#,
        ));
        assert_eq!(src.fetch().unwrap().len(), 1);
        assert_eq!(src.fetch().unwrap().len(), 1);
    }

    #[test]
    fn failed_read_keeps_reporting_io_error() {
        struct DroppedLink;
        impl std::io::Read for DroppedLink {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("link dropped"))
            }
        }

        let src = JsonRecordSource::from_reader(DroppedLink);
        assert!(matches!(src.fetch(), Err(FetchError::Io(_))));
        assert!(matches!(src.fetch(), Err(FetchError::Io(_))));
    }

    #[test]
    fn malformed_json_source_degrades_to_empty() {
        let src = JsonRecordSource::from_bytes("not json");
        assert!(matches!(src.fetch(), Err(FetchError::Decode(_))));
        assert!(fetch_records_or_empty(&src).is_empty());
    }

    #[test]
    fn json_source_from_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"[{"pickupaddress1": "x"}]"#).unwrap();
        let src = JsonRecordSource::from_path(&path).unwrap();
        assert_eq!(fetch_records_or_empty(&src)[0].pickup_address, "x");
    }

    #[test]
    fn vec_is_a_source() {
        let records = vec![AddressRecord::new("a", "b", "c")];
        assert_eq!(fetch_records_or_empty(&records), records);
    }
}

// ── HTTP source ───────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "http"))]
mod http {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use crate::{fetch_records_or_empty, FetchError, HttpRecordSource, RecordSource};

    /// Answer one request on a loopback port and return the URL to fetch.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{addr}/coldata")
    }

    #[test]
    fn ok_response_decodes() {
        let url = serve_once(
            "200 OK",
            r#"[{"pickupaddress1": "1 Main St", "customername": "A", "loancardaccountno": "007"}]"#,
        );
        let src = HttpRecordSource::with_timeout(url.as_str(), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(src.endpoint(), url);
        let records = src.fetch().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].loan_account_no, "007");
    }

    #[test]
    fn error_status_is_fetch_failure() {
        let url = serve_once("503 Service Unavailable", "");
        let src = HttpRecordSource::with_timeout(url, Some(Duration::from_secs(5))).unwrap();
        assert!(matches!(src.fetch(), Err(FetchError::Status(503))));

        let url = serve_once("503 Service Unavailable", "");
        let src = HttpRecordSource::with_timeout(url, Some(Duration::from_secs(5))).unwrap();
        assert!(fetch_records_or_empty(&src).is_empty());
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let src = HttpRecordSource::new(format!("http://{addr}/coldata")).unwrap();
        assert!(matches!(src.fetch(), Err(FetchError::Transport(_))));
    }
}

// ── StaticGeocoder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod static_geocoder {
    use super::*;
    use crate::StaticGeocoder;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let mut g = StaticGeocoder::new();
        g.insert("10 Downing Street", Coordinate::new(51.5034, -0.1276));
        let hits = g.geocode("  10 DOWNING street ").unwrap();
        assert_eq!(hits, vec![Coordinate::new(51.5034, -0.1276)]);
    }

    #[test]
    fn unknown_address_is_empty() {
        let g = StaticGeocoder::new();
        assert!(g.geocode("nowhere").unwrap().is_empty());
    }

    #[test]
    fn blank_address_is_not_found() {
        let g = StaticGeocoder::new();
        assert!(matches!(g.geocode("   "), Err(GeocodeError::NotFound(_))));
    }

    #[test]
    fn csv_table_with_repeated_candidates() {
        let csv = "address,latitude,longitude\n\
                   \"Springfield\",39.7817,-89.6501\n\
                   \"Springfield\",42.1015,-72.5898\n\
                   Shelbyville,39.4062,-88.7900\n";
        let g = StaticGeocoder::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(g.len(), 2);
        let hits = g.geocode("springfield").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], Coordinate::new(39.7817, -89.6501));
    }

    #[test]
    fn csv_bad_number_errors() {
        let csv = "address,latitude,longitude\nX,north,0\n";
        assert!(matches!(
            StaticGeocoder::from_csv_reader(csv.as_bytes()),
            Err(GeocodeError::Csv(_))
        ));
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resolver {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::{resolve_all, CancelToken, GeocodeResolver, ResolverConfig, SkipReason};

    #[test]
    fn middle_failure_is_skipped_and_order_kept() {
        let g = CountingGeocoder::failing_on(vec!["bb"]);
        let out = resolve_all(vec![rec("a"), rec("bb"), rec("ccc")], &g);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].address(), "a");
        assert_eq!(out[1].address(), "ccc");
        assert!(out.iter().all(|d| d.address() != "bb"));
        assert_eq!(g.calls(), 3);
    }

    #[test]
    fn empty_input_makes_no_calls() {
        let g = CountingGeocoder::failing_on(vec![]);
        assert!(resolve_all(Vec::new(), &g).is_empty());
        assert_eq!(g.calls(), 0);

        let resolver = GeocodeResolver::new(CountingGeocoder::failing_on(vec![]));
        let report = resolver.resolve(Vec::new());
        assert!(report.destinations.is_empty());
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn first_candidate_wins() {
        let g = CountingGeocoder::failing_on(vec![]);
        let out = resolve_all(vec![rec("abcd")], &g);
        assert_eq!(out[0].coordinate, Coordinate::new(4.0, 4.0));
        assert_eq!(out[0].name(), "name of abcd");
        assert_eq!(out[0].reference_id(), "LN-abcd");
    }

    #[test]
    fn each_record_resolved_once_in_order_without_dedup() {
        let g = Arc::new(CountingGeocoder::failing_on(vec![]));
        let resolver = GeocodeResolver::from_shared(Arc::clone(&g));
        let report = resolver.resolve(vec![rec("x"), rec("y"), rec("x")]);

        assert_eq!(report.resolved_count(), 3);
        assert_eq!(*g.seen.lock().unwrap(), vec!["x", "y", "x"]);
    }

    #[test]
    fn report_lists_skips_with_reasons() {
        struct Mixed;
        impl Geocoder for Mixed {
            fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
                match address {
                    "ok"    => Ok(vec![Coordinate::new(1.0, 1.0)]),
                    "empty" => Ok(vec![]),
                    "bad"   => Ok(vec![Coordinate::new(f64::NAN, 0.0)]),
                    _       => Err(GeocodeError::NotFound(address.to_owned())),
                }
            }
        }

        let report = GeocodeResolver::new(Mixed)
            .resolve(vec![rec("ok"), rec("empty"), rec("bad"), rec("gone"), rec("ok")]);

        assert_eq!(report.resolved_count(), 2);
        assert_eq!(report.attempted, 5);
        assert!(!report.cancelled);

        let indices: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(matches!(report.skipped[0].reason, SkipReason::NoCandidates));
        assert!(matches!(report.skipped[1].reason, SkipReason::InvalidCandidate(_)));
        assert!(matches!(report.skipped[2].reason, SkipReason::Failed(GeocodeError::NotFound(_))));
        assert_eq!(report.skipped[2].record.pickup_address, "gone");
    }

    #[test]
    fn slow_call_times_out_and_batch_continues() {
        struct Slow;
        impl Geocoder for Slow {
            fn geocode(&self, address: &str) -> GeocodeResult<Vec<Coordinate>> {
                if address == "slow" {
                    std::thread::sleep(Duration::from_secs(2));
                }
                Ok(vec![Coordinate::new(2.0, 2.0)])
            }
        }

        let resolver = GeocodeResolver::new(Slow).with_config(ResolverConfig {
            call_timeout: Some(Duration::from_millis(250)),
            ..ResolverConfig::default()
        });
        let report = resolver.resolve(vec![rec("fast"), rec("slow"), rec("fast too")]);

        assert_eq!(report.resolved_count(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::Failed(GeocodeError::Timeout(_))
        ));
    }

    #[test]
    fn abandoned_calls_are_capped() {
        struct Stuck(AtomicUsize);
        impl Geocoder for Stuck {
            fn geocode(&self, _address: &str) -> GeocodeResult<Vec<Coordinate>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_secs(1));
                Ok(vec![Coordinate::new(2.0, 2.0)])
            }
        }

        let g = Arc::new(Stuck(AtomicUsize::new(0)));
        let resolver = GeocodeResolver::from_shared(Arc::clone(&g)).with_config(ResolverConfig {
            call_timeout:        Some(Duration::from_millis(100)),
            max_abandoned_calls: 1,
        });
        let report = resolver.resolve(vec![rec("a"), rec("b"), rec("c")]);

        assert_eq!(report.resolved_count(), 0);
        assert_eq!(report.attempted, 3);
        assert!(matches!(report.skipped[0].reason, SkipReason::Failed(GeocodeError::Timeout(_))));
        assert!(matches!(report.skipped[1].reason, SkipReason::Failed(GeocodeError::Saturated(1))));
        assert!(matches!(report.skipped[2].reason, SkipReason::Failed(GeocodeError::Saturated(1))));
        assert_eq!(g.0.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.abandoned_calls(), 1);
    }

    #[test]
    fn finished_calls_are_not_counted_as_abandoned() {
        let resolver = GeocodeResolver::new(CountingGeocoder::failing_on(vec![])).with_config(
            ResolverConfig {
                call_timeout:        Some(Duration::from_secs(5)),
                max_abandoned_calls: 1,
            },
        );
        let report = resolver.resolve(vec![rec("a"), rec("b"), rec("c")]);
        assert_eq!(report.resolved_count(), 3);
        assert_eq!(resolver.abandoned_calls(), 0);
    }

    #[test]
    fn cancel_before_start_makes_no_calls() {
        let g = Arc::new(CountingGeocoder::failing_on(vec![]));
        let token = CancelToken::new();
        token.cancel();

        let report = GeocodeResolver::from_shared(Arc::clone(&g))
            .with_cancel_token(token)
            .resolve(vec![rec("a"), rec("b")]);

        assert!(report.cancelled);
        assert!(report.destinations.is_empty());
        assert_eq!(g.calls(), 0);
    }

    #[test]
    fn cancel_mid_batch_discards_in_flight_and_stops() {
        /// Cancels the batch from inside its second call.
        struct CancelOnSecond {
            token: CancelToken,
            calls: AtomicUsize,
        }
        impl Geocoder for CancelOnSecond {
            fn geocode(&self, _address: &str) -> GeocodeResult<Vec<Coordinate>> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
                    self.token.cancel();
                }
                Ok(vec![Coordinate::new(3.0, 3.0)])
            }
        }

        let token = CancelToken::new();
        let g = Arc::new(CancelOnSecond { token: token.clone(), calls: AtomicUsize::new(0) });
        let report = GeocodeResolver::from_shared(Arc::clone(&g))
            .with_cancel_token(token)
            .resolve(vec![rec("a"), rec("b"), rec("c"), rec("d")]);

        assert!(report.cancelled);
        assert_eq!(report.resolved_count(), 1);
        assert_eq!(report.destinations[0].address(), "a");
        assert_eq!(g.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolver_cancel_token_is_shared() {
        let resolver = GeocodeResolver::new(CountingGeocoder::failing_on(vec![]));
        resolver.cancel_token().cancel();
        assert!(resolver.resolve(vec![rec("a")]).cancelled);
    }
}

// ── DestinationSet ────────────────────────────────────────────────────────────

#[cfg(test)]
mod destination_set {
    use wp_core::{distance_km, DestinationId};

    use super::*;
    use crate::{DestinationSet, ResolvedDestination};

    fn dest(address: &str, lat: f64, lon: f64) -> ResolvedDestination {
        ResolvedDestination { record: rec(address), coordinate: Coordinate::new(lat, lon) }
    }

    /// Three points along the equator plus one far north.
    fn sample() -> DestinationSet {
        DestinationSet::new(vec![
            dest("zero", 0.0, 0.0),
            dest("one", 0.0, 1.0),
            dest("two", 0.0, 2.0),
            dest("north", 60.0, 0.0),
        ])
    }

    #[test]
    fn ids_follow_resolution_order() {
        let set = sample();
        assert_eq!(set.len(), 4);
        assert_eq!(set.get(DestinationId(2)).unwrap().address(), "two");
        assert!(set.get(DestinationId(9)).is_none());
        let ids: Vec<DestinationId> = set.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![DestinationId(0), DestinationId(1), DestinationId(2), DestinationId(3)]);
    }

    #[test]
    fn nearest() {
        let set = sample();
        let query = Coordinate::new(0.1, 1.9);
        let (id, d) = set.nearest(query).unwrap();
        assert_eq!(id, DestinationId(2));
        assert!((d - distance_km(query, Coordinate::new(0.0, 2.0))).abs() < 1e-9);
        assert!(DestinationSet::empty().nearest(query).is_none());
    }

    #[test]
    fn nearest_across_antimeridian() {
        let set = DestinationSet::new(vec![dest("west", 0.0, 179.9), dest("far", 0.0, -170.0)]);
        let query = Coordinate::new(0.0, -179.9);
        let (id, d) = set.nearest(query).unwrap();
        assert_eq!(id, DestinationId(0), "got {d} km");
        assert!((d - distance_km(query, Coordinate::new(0.0, 179.9))).abs() < 1e-9);
    }

    #[test]
    fn nearest_at_high_latitude_uses_great_circle() {
        // In degree space (84, 0) is closer; on the sphere (80, 10) is.
        let set = DestinationSet::new(vec![dest("north", 84.0, 0.0), dest("east", 80.0, 10.0)]);
        let query = Coordinate::new(80.0, 0.0);
        let (id, _) = set.nearest(query).unwrap();
        assert_eq!(id, DestinationId(1));
        assert_eq!(Some(id), set.by_distance_from(query).first().map(|h| h.0));
    }

    #[test]
    fn within_radius_sorted() {
        let set = sample();
        let hits = set.within_km(Coordinate::new(0.0, 0.9), 150.0);
        let ids: Vec<DestinationId> = hits.iter().map(|h| h.0).collect();
        assert_eq!(ids, vec![DestinationId(1), DestinationId(0), DestinationId(2)]);
        assert!(hits.iter().all(|h| h.1 <= 150.0));
    }

    #[test]
    fn within_radius_near_pole_falls_back_to_scan() {
        let set = DestinationSet::new(vec![dest("a", 89.5, 0.0), dest("b", 89.5, 180.0)]);
        // Across the pole the two points are ~111 km apart.
        let hits = set.within_km(Coordinate::new(89.5, 0.0), 150.0);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn within_radius_across_antimeridian() {
        let set = DestinationSet::new(vec![dest("west", 0.0, 179.9), dest("east", 0.0, -179.9)]);
        let hits = set.within_km(Coordinate::new(0.0, 179.95), 50.0);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn by_distance_from_orders_everything() {
        let set = sample();
        let all = set.by_distance_from(Coordinate::new(59.0, 0.0));
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].0, DestinationId(3));
        assert!(all.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
