use bson::Bson;
use mongodb_bulk::bulk::batch::MAX_BATCH_BYTES;
use mongodb_bulk::bulk::operation::WriteModel;
use mongodb_bulk::bulk::translate::WRITE_CONCERN_FAILED;
use mongodb_bulk::common::Acknowledgment;
use mongodb_bulk::{BulkWrite, Error, WriteConcern, WriteType};

use mock::{Call, MockCollection, ScriptedCollection, DUPLICATE_KEY};

fn servers() -> Vec<MockCollection> {
    vec![MockCollection::modern(), MockCollection::legacy()]
}

fn wtimeout() -> ::bson::Document {
    doc! { "ok": 1, "n": 0, "err": "waiting for replication timed out", "wtimeout": true }
}

#[test]
fn ordered_duplicate_key_stops_the_bulk_write() {
    for coll in servers() {
        let mut bulk = BulkWrite::ordered(&coll);
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.insert(doc! { "_id": 2 }).unwrap();

        let result = bulk.execute(None).unwrap();

        assert_eq!(1, result.inserted_count);
        assert_eq!(1, result.write_errors.len());
        assert_eq!(1, result.write_errors[0].index);
        assert_eq!(DUPLICATE_KEY, result.write_errors[0].code);
        assert_eq!(1, coll.documents().len());
    }
}

#[test]
fn ordered_legacy_write_stops_sending_after_failure() {
    let coll = MockCollection::legacy();
    let mut bulk = BulkWrite::ordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.insert(doc! { "_id": 2 }).unwrap();
    bulk.execute(None).unwrap();

    assert_eq!(2, coll.legacy_calls());
    assert_eq!(0, coll.diagnostics());
}

#[test]
fn unordered_duplicate_key_continues() {
    for coll in servers() {
        let mut bulk = BulkWrite::unordered(&coll);
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.insert(doc! { "_id": 2 }).unwrap();

        let result = bulk.execute(None).unwrap();

        assert_eq!(2, result.inserted_count);
        assert_eq!(1, result.write_errors.len());
        assert_eq!(1, result.write_errors[0].index);
        assert_eq!(2, coll.documents().len());
    }
}

#[test]
fn unordered_legacy_write_sends_every_operation() {
    let coll = MockCollection::legacy();
    let mut bulk = BulkWrite::unordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.insert(doc! { "_id": 2 }).unwrap();
    bulk.execute(None).unwrap();

    assert_eq!(3, coll.legacy_calls());
    assert_eq!(1, coll.diagnostics());
}

#[test]
fn unordered_indices_refer_to_queue_positions() {
    for coll in servers() {
        let mut bulk = BulkWrite::unordered(&coll);
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.find(doc! { "_id": 2 }).upsert().update_one(doc! { "$set": { "x": 1 } }).unwrap();
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.find(doc! { "_id": 3 }).upsert().update_one(doc! { "$set": { "x": 1 } }).unwrap();

        let result = bulk.execute(None).unwrap();

        assert_eq!(1, result.inserted_count);
        assert_eq!(2, result.upserted_count);
        assert_eq!(1, result.upserted_ids[0].index);
        assert_eq!(Bson::I32(2), result.upserted_ids[0].id);
        assert_eq!(3, result.upserted_ids[1].index);
        assert_eq!(Bson::I32(3), result.upserted_ids[1].id);
        assert_eq!(1, result.write_errors.len());
        assert_eq!(2, result.write_errors[0].index);
    }
}

#[test]
fn ordered_write_error_skips_later_batches() {
    for coll in servers() {
        let mut bulk = BulkWrite::ordered(&coll);
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.find(doc! { "_id": 1 }).update_one(doc! { "$set": { "x": 1 } }).unwrap();
        bulk.find(doc! { "_id": 1 }).remove_one().unwrap();

        let result = bulk.execute(None).unwrap();

        assert_eq!(0, result.matched_count);
        assert_eq!(0, result.removed_count);
        assert_eq!(1, coll.documents().len());
        assert!(coll.calls().iter().all(|c| match *c {
            Call::Legacy(WriteType::Insert) |
            Call::WriteCommand { write_type: WriteType::Insert, .. } |
            Call::IsMaster => true,
            _ => false,
        }));
    }
}

#[test]
fn ordered_write_error_discards_write_concern_errors() {
    let coll = MockCollection::legacy();
    coll.set_diagnostic_reply(wtimeout());

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.find(doc! { "_id": 1 }).update_one(doc! { "$set": { "x": 1 } }).unwrap();
    bulk.insert(doc! { "_id": 1 }).unwrap();

    let result = bulk.execute(None).unwrap();

    assert_eq!(2, coll.diagnostics());
    assert_eq!(1, result.inserted_count);
    assert_eq!(1, result.matched_count);
    assert_eq!(1, result.write_errors.len());
    assert_eq!(2, result.write_errors[0].index);
    assert!(result.write_concern_errors.is_empty());
}

#[test]
fn ordered_success_keeps_write_concern_errors() {
    let coll = MockCollection::legacy();
    coll.set_diagnostic_reply(wtimeout());

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.find(doc! { "_id": 1 }).remove_one().unwrap();

    let result = bulk.execute(None).unwrap();

    assert_eq!(2, result.write_concern_errors.len());
    assert!(result.write_concern_errors.iter().all(|e| e.is_timeout()));
    assert_eq!(WRITE_CONCERN_FAILED, result.write_concern_errors[0].code);
}

#[test]
fn unordered_write_error_keeps_write_concern_errors() {
    let coll = MockCollection::legacy();
    coll.set_diagnostic_reply(wtimeout());

    let mut bulk = BulkWrite::unordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.find(doc! { "_id": 1 }).update_one(doc! { "$set": { "x": 1 } }).unwrap();
    bulk.insert(doc! { "_id": 1 }).unwrap();

    let result = bulk.execute(None).unwrap();

    assert_eq!(1, result.write_errors.len());
    assert_eq!(2, result.write_concern_errors.len());
}

#[test]
fn command_write_concern_error_is_reported() {
    let coll = MockCollection::modern();
    coll.set_write_concern_error(doc! { "code": 79, "errmsg": "unrecognized getLastError mode" });

    let mut bulk = BulkWrite::unordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();

    let result = bulk.execute(None).unwrap();

    assert_eq!(1, result.inserted_count);
    assert_eq!(1, result.write_concern_errors.len());
    assert_eq!(79, result.write_concern_errors[0].code);
    assert!(!result.is_ok());
}

#[test]
fn modified_count_is_unknown_on_legacy_servers() {
    let coll = MockCollection::legacy();
    coll.insert_existing(doc! { "_id": 1, "x": 0 });

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.find(doc! { "_id": 1 }).update(doc! { "$set": { "x": 1 } }).unwrap();
    let result = bulk.execute(None).unwrap();

    assert_eq!(1, result.matched_count);
    assert_eq!(None, result.modified_count);
}

#[test]
fn modified_count_is_reported_by_write_commands() {
    let coll = MockCollection::modern();
    coll.insert_existing(doc! { "_id": 1, "x": 1 });
    coll.insert_existing(doc! { "_id": 2, "x": 0 });
    coll.insert_existing(doc! { "_id": 3, "x": 0 });

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.find(doc! {}).update(doc! { "$set": { "x": 1 } }).unwrap();
    let result = bulk.execute(None).unwrap();

    assert_eq!(3, result.matched_count);
    assert_eq!(Some(2), result.modified_count);
}

#[test]
fn legacy_upsert_recovers_client_supplied_ids() {
    let coll = MockCollection::legacy();

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.find(doc! { "_id": "a" }).upsert().update_one(doc! { "$set": { "x": 1 } }).unwrap();
    bulk.find(doc! { "y": 2 }).upsert().replace_one(doc! { "_id": "b", "y": 2 }).unwrap();
    bulk.find(doc! { "z": 3 }).upsert().update_one(doc! { "$set": { "z": 3 } }).unwrap();

    let result = bulk.execute(None).unwrap();

    assert_eq!(3, result.upserted_count);
    assert_eq!(Bson::String(String::from("a")), result.upserted_ids[0].id);
    assert_eq!(Bson::String(String::from("b")), result.upserted_ids[1].id);
    match result.upserted_ids[2].id {
        Bson::ObjectId(_) => (),
        ref other => panic!("expected a generated id, got {}", other),
    }
}

#[test]
fn inserts_receive_generated_ids() {
    for coll in servers() {
        let mut bulk = BulkWrite::ordered(&coll);
        bulk.insert(doc! { "x": 1 }).unwrap();
        bulk.execute(None).unwrap();

        let documents = coll.documents();
        match documents[0].get("_id") {
            Some(&Bson::ObjectId(_)) => (),
            other => panic!("expected a generated id, got {:?}", other),
        }
    }
}

#[test]
fn batches_stay_under_the_byte_ceiling_once_ids_are_generated() {
    // Each document encodes to exactly 1 MiB before its `_id` is added, so
    // sixteen of them fill the ceiling only while they lack one.
    let padding: String = ::std::iter::repeat('x').take(MAX_BATCH_BYTES / 16 - 13).collect();

    let coll = ScriptedCollection::new(true, vec![]);
    let mut bulk = BulkWrite::ordered(&coll);
    for _ in 0..16 {
        bulk.insert(doc! { "s": padding.clone() }).unwrap();
    }
    bulk.execute(None).unwrap();

    let commands = coll.commands.borrow();
    assert_eq!(2, commands.len());
    assert_eq!(16, commands.iter().map(|documents| documents.len()).sum::<usize>());

    for documents in commands.iter() {
        let mut sent = 0;
        for document in documents {
            assert!(document.contains_key("_id"));
            let mut buf = Vec::new();
            ::bson::encode_document(&mut buf, document).unwrap();
            sent += buf.len();
        }
        assert!(sent <= MAX_BATCH_BYTES,
                "sent {} bytes in one batch, ceiling is {}",
                sent,
                MAX_BATCH_BYTES);
    }
}

#[test]
fn removes_one_or_all_matches() {
    for coll in servers() {
        for i in 0..4 {
            coll.insert_existing(doc! { "_id": i, "x": i % 2 });
        }

        let mut bulk = BulkWrite::ordered(&coll);
        bulk.find(doc! { "x": 0 }).remove_one().unwrap();
        bulk.find(doc! { "x": 1 }).remove().unwrap();
        let result = bulk.execute(None).unwrap();

        assert_eq!(3, result.removed_count);
        assert_eq!(1, coll.documents().len());
    }
}

#[test]
fn mixed_bulk_write_applies_every_operation() {
    for coll in servers() {
        let mut bulk = BulkWrite::ordered(&coll);
        bulk.insert(doc! { "_id": 1, "x": 1 }).unwrap();
        bulk.insert(doc! { "_id": 2, "x": 2 }).unwrap();
        bulk.find(doc! { "_id": 1 }).update_one(doc! { "$inc": { "x": 10 } }).unwrap();
        bulk.find(doc! { "_id": 2 }).replace_one(doc! { "y": 2 }).unwrap();
        bulk.find(doc! { "_id": 3 }).upsert().update(doc! { "$set": { "x": 3 } }).unwrap();
        bulk.find(doc! { "_id": 2 }).remove_one().unwrap();

        let result = bulk.execute(None).unwrap();

        assert_eq!(2, result.inserted_count);
        assert_eq!(2, result.matched_count);
        assert_eq!(1, result.upserted_count);
        assert_eq!(4, result.upserted_ids[0].index);
        assert_eq!(1, result.removed_count);
        assert!(result.is_ok());

        let documents = coll.documents();
        assert_eq!(2, documents.len());
        assert_eq!(Some(&Bson::I64(11)), documents[0].get("x"));
    }
}

#[test]
fn execute_twice_is_an_error() {
    for coll in servers() {
        let mut bulk = BulkWrite::ordered(&coll);
        bulk.insert(doc! { "_id": 1 }).unwrap();
        bulk.execute(None).unwrap();
        let calls = coll.calls().len();

        match bulk.execute(None) {
            Err(Error::OperationError(_)) => (),
            other => panic!("expected an operation error, got {:?}", other),
        }
        assert!(bulk.is_executed());
        assert_eq!(calls, coll.calls().len());
        assert!(bulk.insert(doc! { "_id": 2 }).is_err());
    }
}

#[test]
fn failed_execution_still_consumes_the_bulk_write() {
    let coll = MockCollection::modern();
    coll.fail_commands(doc! { "ok": 0, "code": 2, "errmsg": "bad" });

    let mut bulk = BulkWrite::ordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.find(doc! { "_id": 1 }).remove_one().unwrap();

    match bulk.execute(None) {
        Err(Error::CommandError(2, ref message)) if message == "bad" => (),
        other => panic!("expected a command error, got {:?}", other),
    }

    // The delete batch was abandoned.
    assert_eq!(1, coll.write_commands());
    assert!(bulk.is_executed());
    assert!(bulk.execute(None).is_err());
}

#[test]
fn unexpected_legacy_acknowledgement_aborts() {
    let coll = MockCollection::legacy();
    coll.fail_legacy(doc! { "ok": 0, "errmsg": "not master" });

    let mut bulk = BulkWrite::unordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();
    bulk.insert(doc! { "_id": 2 }).unwrap();

    match bulk.execute(None) {
        Err(Error::ResponseError(_)) => (),
        other => panic!("expected a response error, got {:?}", other),
    }
    assert_eq!(1, coll.legacy_calls());
}

#[test]
fn empty_bulk_write_returns_an_empty_result() {
    for coll in servers() {
        let mut bulk = BulkWrite::unordered(&coll);
        let result = bulk.execute(None).unwrap();

        assert_eq!(0, result.inserted_count);
        assert_eq!(Some(0), result.modified_count);
        assert!(result.is_ok());
        assert_eq!(vec![Call::IsMaster], coll.calls());
    }
}

#[test]
fn write_concern_override_reaches_the_server() {
    let coll = MockCollection::legacy();
    let mut bulk = BulkWrite::ordered(&coll);
    bulk.insert(doc! { "_id": 1 }).unwrap();

    let mut write_concern = WriteConcern::new();
    write_concern.w = Acknowledgment::Tag(String::from("majority"));
    write_concern.w_timeout = 500;
    bulk.execute(Some(write_concern.clone())).unwrap();

    assert_eq!(Some(&Call::Diagnostic(write_concern)), coll.calls().last());
}

#[test]
fn write_models_are_validated_when_queued() {
    let coll = MockCollection::modern();
    let mut bulk = BulkWrite::ordered(&coll);

    let replace = WriteModel::ReplaceOne {
        filter: doc! { "_id": 1 },
        replacement: doc! { "$set": { "x": 1 } },
        upsert: None,
    };
    let update = WriteModel::UpdateMany {
        filter: doc! {},
        update: doc! { "x": 1 },
        upsert: Some(false),
    };

    match bulk.add(replace) {
        Err(ref err @ Error::ArgumentError(_)) => assert!(err.is_validation_error()),
        other => panic!("expected an argument error, got {:?}", other),
    }
    assert!(bulk.add(update).is_err());
    assert!(bulk.find(doc! {}).update(doc! {}).is_err());
    assert!(bulk.is_empty());

    bulk.add(WriteModel::InsertOne { document: doc! { "_id": 1 } }).unwrap();
    bulk.add(WriteModel::DeleteMany { filter: doc! { "_id": 1 } }).unwrap();
    assert_eq!(2, bulk.len());

    let result = bulk.execute(None).unwrap();
    assert_eq!(1, result.inserted_count);
    assert_eq!(1, result.removed_count);
}

#[test]
fn oversized_documents_are_rejected_when_queued() {
    let coll = MockCollection::modern();
    let mut bulk = BulkWrite::ordered(&coll);

    let blob = "x".repeat(16 * 1024 * 1024);
    match bulk.insert(doc! { "_id": 1, "blob": blob }) {
        Err(Error::CapacityError(_)) => (),
        other => panic!("expected a capacity error, got {:?}", other),
    }
    assert!(bulk.is_empty());
}

#[test]
fn large_bulk_writes_are_split_into_batches() {
    let coll = MockCollection::modern();
    let mut bulk = BulkWrite::ordered(&coll);
    for i in 0..2500 {
        bulk.insert(doc! { "_id": i }).unwrap();
    }

    let result = bulk.execute(None).unwrap();

    assert_eq!(2500, result.inserted_count);
    let counts: Vec<usize> = coll.calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::WriteCommand { count, ordered, .. } => {
                assert!(ordered);
                Some(count)
            }
            _ => None,
        })
        .collect();
    assert_eq!(vec![1000, 1000, 500], counts);
}
