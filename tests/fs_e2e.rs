use fatvol::{FileStore, FsError, MockStore, Volume};

#[test]
fn e2e_format_write_read_list_rename_delete() {
    let mut store = MockStore::new(512 * 64);
    Volume::format(&mut store, 64).expect("format failed");
    let mut volume = Volume::mount(&mut store).expect("mount failed");

    let data = b"hello world";
    volume.create_file("HELLO   TXT", data).expect("create failed");
    assert_eq!(volume.read_file("HELLO   TXT").expect("read failed"), data);

    let list = volume.list_root().expect("list failed");
    assert!(list.iter().any(|e| &e.name11() == b"HELLO   TXT"));

    volume.rename_file("HELLO   TXT", "WORLD   TXT").expect("rename failed");
    assert_eq!(volume.read_file("WORLD   TXT").expect("read failed"), data);
    assert!(matches!(volume.read_file("HELLO   TXT"), Err(FsError::NotFound)));

    volume.remove_file("WORLD   TXT").expect("delete failed");
    let list = volume.list_root().expect("list failed");
    assert!(list.is_empty(), "file still present after delete");
}

#[test]
fn e2e_multiple_files_share_the_volume() {
    let mut store = MockStore::new(512 * 128);
    Volume::format(&mut store, 128).expect("format failed");
    let mut volume = Volume::mount(&mut store).expect("mount failed");

    let one = vec![1u8; 300];
    let two = vec![2u8; 1500];
    let three = vec![3u8; 513];
    volume.create_file("ONE     TXT", &one).unwrap();
    volume.create_file("TWO     TXT", &two).unwrap();
    volume.create_file("THREE   TXT", &three).unwrap();

    // removing the middle file must not disturb its neighbours
    volume.remove_file("TWO     TXT").unwrap();
    assert_eq!(volume.read_file("ONE     TXT").unwrap(), one);
    assert_eq!(volume.read_file("THREE   TXT").unwrap(), three);

    // the freed gap is reused first-fit by the next create
    let four = vec![4u8; 700];
    let entry = volume.create_file("FOUR    TXT", &four).unwrap();
    assert_eq!(entry.start_cluster, 3);
    assert_eq!(volume.read_file("FOUR    TXT").unwrap(), four);
}

#[test]
fn e2e_disk_image_file_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("disk.img");

    let content: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    {
        let mut store = FileStore::create(&path, 64 * 512).expect("create image failed");
        Volume::format(&mut store, 64).expect("format failed");
        let mut volume = Volume::mount(&mut store).expect("mount failed");
        volume.create_file("PERSIST BIN", &content).expect("create failed");
    }

    let mut store = FileStore::open(&path).expect("reopen failed");
    let mut volume = Volume::mount(&mut store).expect("remount failed");
    assert_eq!(volume.read_file("PERSIST BIN").expect("read failed"), content);

    volume.rename_file("PERSIST BIN", "RENAMED BIN").expect("rename failed");
    drop(volume);

    let mut store = FileStore::open(&path).expect("reopen failed");
    let mut volume = Volume::mount(&mut store).expect("remount failed");
    assert_eq!(volume.read_file("RENAMED BIN").expect("read failed"), content);
}
