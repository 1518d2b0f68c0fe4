/*!
 * Shared Memory Tests
 * Tests for the POSIX clock segment shared with workers
 */

use oss_kernel::ipc::shm::{ClockSegment, ShmError, ShmPermission, SEGMENT_SIZE};
use oss_kernel::SimTime;
use pretty_assertions::assert_eq;

#[test]
fn test_create_starts_at_zero() {
    let segment = ClockSegment::create().unwrap();
    assert!(segment.name().starts_with("/oss-clock-"));
    assert_eq!(segment.permission(), ShmPermission::ReadWrite);
    assert_eq!(segment.read(), SimTime::ZERO);
    segment.release().unwrap();
}

#[test]
fn test_reader_sees_published_time() {
    let writer = ClockSegment::create().unwrap();
    let reader = ClockSegment::attach(writer.name()).unwrap();
    assert_eq!(reader.permission(), ShmPermission::ReadOnly);

    writer.publish(SimTime::new(7, 123_456_789)).unwrap();
    assert_eq!(reader.read(), SimTime::new(7, 123_456_789));

    writer.publish(SimTime::new(8, 0)).unwrap();
    assert_eq!(reader.read(), SimTime::new(8, 0));

    reader.release().unwrap();
    writer.release().unwrap();
}

#[test]
fn test_reader_cannot_publish() {
    let writer = ClockSegment::create().unwrap();
    let reader = ClockSegment::attach(writer.name()).unwrap();

    let result = reader.publish(SimTime::new(1, 0));
    assert!(matches!(result, Err(ShmError::PermissionDenied(_))));
    assert_eq!(writer.read(), SimTime::ZERO);

    reader.release().unwrap();
    writer.release().unwrap();
}

#[test]
fn test_attach_missing_segment_fails() {
    let result = ClockSegment::attach("/oss-clock-does-not-exist");
    assert!(matches!(result, Err(ShmError::Attach { .. })));
}

#[test]
fn test_create_named_is_exclusive() {
    let name = format!("/oss-clock-test-{}", std::process::id());
    let first = ClockSegment::create_named(&name).unwrap();

    let second = ClockSegment::create_named(&name);
    assert!(matches!(second, Err(ShmError::Create { .. })));

    first.release().unwrap();
}

#[test]
fn test_release_unlinks_for_owner_only() {
    let writer = ClockSegment::create().unwrap();
    let name = writer.name().to_string();

    // A reader detaching leaves the segment in place
    ClockSegment::attach(&name).unwrap().release().unwrap();
    let again = ClockSegment::attach(&name).unwrap();
    again.release().unwrap();

    writer.release().unwrap();
    assert!(ClockSegment::attach(&name).is_err());
}

#[test]
fn test_drop_releases_owned_segment() {
    let name = {
        let writer = ClockSegment::create().unwrap();
        writer.name().to_string()
    };
    assert!(ClockSegment::attach(&name).is_err());
}

#[test]
fn test_segment_is_two_words() {
    assert_eq!(SEGMENT_SIZE, 8);
}
