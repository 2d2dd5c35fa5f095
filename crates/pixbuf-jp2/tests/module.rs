//! Host-facing behaviour: registry dispatch, incremental loading, saving.

mod common;

use common::{FLAT, Fixture};
use pixbuf_core::{
    Colorspace, LoadObserver, ModuleRegistry, Pixbuf, PixbufError, PixbufModule, SampleLayout,
};
use pixbuf_jp2::{DecodeOptions, Jp2Module};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq, Eq)]
enum Event {
    Size(u32, u32),
    Prepared(u8),
    Updated(u32, u32, u32, u32),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl LoadObserver for Recorder {
    fn size_prepared(&mut self, width: u32, height: u32) {
        self.0.lock().unwrap().push(Event::Size(width, height));
    }

    fn area_prepared(&mut self, pixbuf: &Pixbuf) {
        self.0.lock().unwrap().push(Event::Prepared(pixbuf.n_channels()));
    }

    fn area_updated(&mut self, _pixbuf: &Pixbuf, x: u32, y: u32, width: u32, height: u32) {
        self.0.lock().unwrap().push(Event::Updated(x, y, width, height));
    }
}

fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    pixbuf_jp2::register(&mut registry);
    registry
}

#[test]
fn registry_sniffs_both_flavours() {
    let registry = registry();
    let jp2 = Fixture::new(2, 2, 3).jp2();
    let j2k = Fixture::new(2, 2, 3).codestream();

    assert_eq!(registry.detect(&jp2, None).map(|m| m.info().name), Some("jp2"));
    assert_eq!(registry.detect(&j2k, None).map(|m| m.info().name), Some("jp2"));
    assert!(registry.detect(b"\x89PNG\r\n\x1a\n", None).is_none());
}

#[test]
fn registry_falls_back_to_extension() {
    let registry = registry();
    for name in ["a.j2k", "a.JP2", "a.jpc", "a.jpf", "a.jpm", "a.jpx"] {
        assert!(registry.detect(b"", Some(Path::new(name))).is_some(), "{name}");
    }
    assert!(registry.get_by_mime_type("image/jpx").is_some());
}

#[test]
fn registry_loads_file() {
    let registry = registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.bin");
    std::fs::write(&path, Fixture::new(3, 3, 4).jp2()).unwrap();

    let pixbuf = registry.load_file(&path).unwrap();
    assert_eq!((pixbuf.width(), pixbuf.height(), pixbuf.n_channels()), (3, 3, 4));
    assert!(pixbuf.has_alpha());
}

#[test]
fn incremental_load_in_small_chunks() {
    let data = Fixture::new(5, 4, 2).jp2();
    let recorder = Recorder::default();

    let mut load = Jp2Module::new().begin_load(Box::new(recorder.clone())).unwrap();
    for chunk in data.chunks(7) {
        load.load_increment(chunk).unwrap();
    }
    assert!(recorder.events().is_empty());

    let pixbuf = load.stop_load().unwrap();
    assert_eq!((pixbuf.width(), pixbuf.height()), (5, 4));
    assert!(pixbuf.pixels().iter().all(|&v| v == FLAT));
    assert_eq!(
        recorder.events(),
        [Event::Size(5, 4), Event::Prepared(2), Event::Updated(0, 0, 5, 4)]
    );
}

#[test]
fn incremental_load_honours_options() {
    let data = Fixture::new(5, 3, 3).levels(1).jp2();
    let module = Jp2Module::with_options(DecodeOptions::new().with_reduce(1));
    assert_eq!(module.options().reduce(), 1);

    let mut load = module.begin_load(Box::new(Recorder::default())).unwrap();
    load.load_increment(&data).unwrap();
    let pixbuf = load.stop_load().unwrap();
    assert_eq!((pixbuf.width(), pixbuf.height()), (3, 2));
}

#[test]
fn incremental_failure_skips_observer() {
    let recorder = Recorder::default();
    let mut load = Jp2Module::new().begin_load(Box::new(recorder.clone())).unwrap();
    load.load_increment(&Fixture::new(2, 2, 3).codestream()).unwrap();

    let err = load.stop_load().unwrap_err();
    assert!(err.to_string().contains("Unsupported colorspace"), "{err}");
    assert!(recorder.events().is_empty());
}

#[test]
fn saving_is_unsupported() {
    let module = Jp2Module::new();
    let pixbuf = Pixbuf::from_data(vec![0u8; 12], Colorspace::Rgb, SampleLayout::packed(2, 2, 3), None).unwrap();

    let mut out = Vec::new();
    let err = module.save(&mut out, &pixbuf, &[]).unwrap_err();
    assert!(matches!(err, PixbufError::UnsupportedOperation(_)));
    assert!(out.is_empty());

    let mut sink = |_: &[u8]| -> std::io::Result<()> { panic!("no output expected") };
    assert!(module.save_to_callback(&mut sink, &pixbuf, &[]).unwrap_err().is_unsupported());
}

#[test]
fn module_is_shareable_across_threads() {
    let module = Arc::new(Jp2Module::new());
    let handles: Vec<_> = (1..=4u16)
        .map(|components| {
            let module = Arc::clone(&module);
            std::thread::spawn(move || {
                let data = Fixture::new(4, 4, components).jp2();
                module.load(&mut std::io::Cursor::new(data)).map(|p| p.n_channels())
            })
        })
        .collect();

    let channels: Vec<u8> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(channels, [1, 2, 3, 4]);
}
