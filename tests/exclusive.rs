use oplock_core::nt_status::NTStatus;
use oplock_manager::config::OplockConfig;
use oplock_manager::open::{CreateDisposition, FileAccessMask, FileIdentity, OpenParameters, ShareAccess};
use oplock_manager::oplock::{BreakDecision, BreakReason, GrantState, OplockLevel, OplockTable};
use oplock_manager::server::{FsControlCode, FsControlOutcome, OplockManager};

const FILE: FileIdentity = FileIdentity::new(3, 0x77);

fn open(disposition: CreateDisposition, access: FileAccessMask, share: ShareAccess) -> OpenParameters {
    OpenParameters::new(disposition, access, share)
}

fn reader() -> OpenParameters {
    open(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, ShareAccess::all())
}

fn writer() -> OpenParameters {
    open(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA | FileAccessMask::FILE_WRITE_DATA, ShareAccess::all())
}

#[test]
fn test_batch_breaks_to_level2_and_acknowledges() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, open(CreateDisposition::OpenIf, FileAccessMask::GENERIC_READ, ShareAccess::READ));
    let token = manager.fs_control(holder, FsControlCode::RequestBatchOplock as u32)
        .unwrap()
        .into_token()
        .unwrap();
    assert_eq!(token.level(), OplockLevel::Batch);

    let (_, decision) = manager.create_with_decision(FILE, reader());
    assert_eq!(decision, BreakDecision::BreakToLevel2);
    assert_eq!(token.break_reason(), Some(BreakReason::BrokenToLevel2));
    assert_eq!(token.information(), 0x7);

    let outcome = manager.fs_control(holder, FsControlCode::OplockBreakAcknowledge as u32).unwrap();
    assert_eq!(outcome.status(), NTStatus::StatusPending);
    let level2 = outcome.into_token().unwrap();
    assert_eq!(level2.level(), OplockLevel::Level2);
    assert_ne!(level2.grant_id(), token.grant_id());

    let snapshot = manager.snapshot(FILE).unwrap();
    assert_eq!(snapshot.level, OplockLevel::Level2);
    assert_eq!(snapshot.state, GrantState::Granted);

    let stats = manager.stats();
    assert_eq!(stats.exclusive_granted, 1);
    assert_eq!(stats.level2_granted, 1);
    assert_eq!(stats.breaks_to_level2, 1);
    assert_eq!(stats.break_acks, 1);
}

#[test]
fn test_pending_downgrade_survives_other_requests() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    let token = manager.request_oplock(holder, OplockLevel::Batch).unwrap();
    let other = manager.create(FILE, reader());
    assert_eq!(token.break_reason(), Some(BreakReason::BrokenToLevel2));

    let err = manager.request_oplock(other, OplockLevel::Level2).unwrap_err();
    assert_eq!(NTStatus::from(&err), NTStatus::OplockBreakInProgress);
    assert!(err.is_not_granted());

    let level2 = manager.acknowledge_break(holder, true).unwrap().unwrap();
    assert_eq!(level2.level(), OplockLevel::Level2);

    let shared = manager.request_oplock(other, OplockLevel::Level2).unwrap();
    assert_eq!(shared.grant_id(), level2.grant_id());
    assert_eq!(manager.snapshot(FILE).unwrap().holder_count, 2);
}

#[test]
fn test_closing_the_holder_ends_a_pending_downgrade() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    manager.request_oplock(holder, OplockLevel::Exclusive).unwrap();
    let other = manager.create(FILE, reader());

    assert!(manager.request_oplock(other, OplockLevel::Level2).is_err());
    manager.close(holder).unwrap();
    assert!(manager.request_oplock(other, OplockLevel::Level2).is_ok());
}

#[test]
fn test_byte_range_locks_refuse_the_downgrade() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    manager.request_oplock(holder, OplockLevel::Batch).unwrap();
    manager.create(FILE, reader());

    manager.set_byte_range_locks(holder, 1).unwrap();
    let outcome = manager.fs_control(holder, FsControlCode::OplockBreakAcknowledge as u32).unwrap();
    assert!(matches!(outcome, FsControlOutcome::Completed));
    assert!(manager.snapshot(FILE).is_none());
    assert_eq!(manager.stats().level2_granted, 0);
}

#[test]
fn test_acknowledge_without_level2_gives_up_the_oplock() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, open(CreateDisposition::OpenIf, FileAccessMask::FILE_READ_DATA, ShareAccess::all()));
    manager.request_oplock(holder, OplockLevel::Exclusive).unwrap();
    manager.create(FILE, reader());

    let outcome = manager.fs_control(holder, FsControlCode::OplockBreakAckNo2 as u32).unwrap();
    assert!(matches!(outcome, FsControlOutcome::Completed));
    assert_eq!(outcome.status(), NTStatus::StatusSuccess);
    assert!(manager.snapshot(FILE).is_none());
}

#[test]
fn test_acknowledge_requires_a_broken_grant() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());

    let err = manager.acknowledge_break(holder, true).unwrap_err();
    assert_eq!(NTStatus::from(&err), NTStatus::ObjectNameNotFound);

    manager.request_oplock(holder, OplockLevel::Batch).unwrap();
    let err = manager.acknowledge_break(holder, true).unwrap_err();
    assert_eq!(NTStatus::from(&err), NTStatus::InvalidOplockProtocol);
}

#[test]
fn test_writer_breaks_exclusive_to_none() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    let token = manager.request_oplock(holder, OplockLevel::Exclusive).unwrap();

    manager.create(FILE, writer());
    assert_eq!(token.break_reason(), Some(BreakReason::BrokenToNone));

    // A level 2 acknowledgement cannot revive a grant broken to none.
    assert!(manager.acknowledge_break(holder, true).unwrap().is_none());
}

#[test]
fn test_downgrade_can_be_disabled() {
    let config = OplockConfig::builder()
        .allow_exclusive_downgrade(false)
        .build()
        .unwrap();
    let manager = OplockManager::new(config);
    let holder = manager.create(FILE, reader());
    let token = manager.request_oplock(holder, OplockLevel::Batch).unwrap();

    manager.create(FILE, reader());
    assert_eq!(token.break_reason(), Some(BreakReason::BrokenToNone));
}

#[test]
fn test_exclusive_needs_a_single_opener() {
    let manager = OplockManager::default();
    let first = manager.create(FILE, reader());
    let second = manager.create(FILE, reader());

    for level in [OplockLevel::Exclusive, OplockLevel::Batch, OplockLevel::Filter] {
        let err = manager.request_oplock(first, level).unwrap_err();
        assert!(err.is_not_granted(), "{:?}", level);
    }

    manager.close(second).unwrap();
    assert!(manager.request_oplock(first, OplockLevel::Filter).is_ok());
}

#[test]
fn test_filter_tolerates_shared_readers() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    let token = manager.fs_control(holder, FsControlCode::RequestFilterOplock as u32)
        .unwrap()
        .into_token()
        .unwrap();

    let (_, decision) = manager.create_with_decision(FILE, reader());
    assert_eq!(decision, BreakDecision::NoBreak);
    let (_, decision) = manager.create_with_decision(FILE, open(CreateDisposition::Open, FileAccessMask::FILE_READ_DATA, ShareAccess::READ));
    assert_eq!(decision, BreakDecision::BreakToNone);
    assert_eq!(token.break_reason(), Some(BreakReason::BrokenToNone));
}

#[test]
fn test_attribute_only_open_never_breaks() {
    let manager = OplockManager::default();
    let holder = manager.create(FILE, reader());
    let token = manager.request_oplock(holder, OplockLevel::Batch).unwrap();

    let (_, decision) = manager.create_with_decision(FILE, open(CreateDisposition::Open, FileAccessMask::FILE_READ_ATTRIBUTES, ShareAccess::empty()));
    assert_eq!(decision, BreakDecision::NoBreak);
    assert!(!token.is_signaled());
}

#[test]
fn test_conflicting_requests_on_the_table() {
    let table = OplockTable::default();
    let h1 = oplock_manager::open::HandleId::new(1);
    let h2 = oplock_manager::open::HandleId::new(2);

    table.request(FILE, h1, OplockLevel::Level2).unwrap();
    let err = table.request(FILE, h2, OplockLevel::Batch).unwrap_err();
    assert!(err.is_not_granted());

    let other = FileIdentity::new(3, 0x78);
    table.request(other, h1, OplockLevel::Batch).unwrap();
    let err = table.request(other, h2, OplockLevel::Level2).unwrap_err();
    assert!(err.is_not_granted());

    let err = table.request(other, h2, OplockLevel::None).unwrap_err();
    assert!(!err.is_not_granted());
    assert_eq!(table.stats().denied, 2);
}
