use uvm_addresses::PageNumber;
use uvm_info::memory::{NUM_PAGES, PAGE_SIZE, SWAP_FILE_SIZE};
use uvm_swap::{PageBuf, SwapError, SwapStore};

fn patterned(seed: u8) -> Box<PageBuf> {
    let mut buf = Box::new([0u8; PAGE_SIZE]);
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(31).wrapping_add(seed);
    }
    buf
}

#[test]
fn file_is_fully_sized_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let swap = SwapStore::create(Some(dir.path())).unwrap();
    assert_eq!(swap.len().unwrap(), SWAP_FILE_SIZE);
}

#[test]
fn swap_file_is_unlinked() {
    let dir = tempfile::tempdir().unwrap();
    let _swap = SwapStore::create(Some(dir.path())).unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn untouched_slot_reads_zero() {
    let swap = SwapStore::create(None).unwrap();
    let mut buf = patterned(1);
    swap.read_page(PageNumber::new(42), &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn slots_do_not_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let swap = SwapStore::create(Some(dir.path())).unwrap();

    let last = PageNumber::new(u16::try_from(NUM_PAGES - 1).unwrap());
    let a = patterned(7);
    let b = patterned(200);
    swap.write_page(PageNumber::new(5), &a).unwrap();
    swap.write_page(PageNumber::new(6), &b).unwrap();
    swap.write_page(last, &b).unwrap();

    let mut got = Box::new([0u8; PAGE_SIZE]);
    swap.read_page(PageNumber::new(5), &mut got).unwrap();
    assert_eq!(got, a);
    swap.read_page(PageNumber::new(6), &mut got).unwrap();
    assert_eq!(got, b);
    swap.read_page(last, &mut got).unwrap();
    assert_eq!(got, b);

    // writing the last slot must not grow the file
    assert_eq!(swap.len().unwrap(), SWAP_FILE_SIZE);
}

#[test]
fn missing_directory_is_a_create_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = SwapStore::create(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, SwapError::Create(_)));
}
