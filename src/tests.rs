use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use bytes::{BufMut, Bytes, BytesMut};
use crossbeam::channel::{unbounded, Sender};

use crate::{
    atom::{box_info, BoxParser, BoxTree},
    atom_types::{avc_codec_string, descriptor_length},
    config::Config,
    events::{EventHub, FragmentRef, LoadStats, NotificationSource, PlayerEvent, SubscriptionId},
    level::{LevelMediaInfo, MediaLedger},
    observer::MediaInfoObserver,
    reader::{read_big16, read_big32, read_big64, read_string},
    sps::{NoSpsDecoder, SpsInfo},
    track::{sample_rate, TrackMediaInfo, TrackType},
    FourCC,
};

const STSD: [FourCC; 6] = [
    FourCC::Moov,
    FourCC::Trak,
    FourCC::Mdia,
    FourCC::Minf,
    FourCC::Stbl,
    FourCC::Stsd,
];

/// SPS NAL for High profile, level 3.1.
const SPS: [u8; 8] = [0x67, 0x64, 0x00, 0x1f, 0xac, 0xd9, 0x40, 0x50];
const PPS: [u8; 4] = [0x68, 0xeb, 0xe3, 0xcb];
/// AudioSpecificConfig: AAC LC, 44.1kHz, stereo.
const ASC: [u8; 2] = [0x12, 0x10];

fn boxed(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(8 + payload.len());
    buf.put_u32(8 + payload.len() as u32);
    buf.put_slice(name);
    buf.put_slice(payload);
    buf.to_vec()
}

fn full_box(name: &[u8; 4], version: u8, body: &[u8]) -> Vec<u8> {
    let mut payload = BytesMut::new();
    payload.put_u8(version);
    payload.put_slice(&[0, 0, 0]);
    payload.put_slice(body);
    boxed(name, &payload)
}

fn mvhd(time_scale: u32) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(0); // creation
    body.put_u32(0); // modification
    body.put_u32(time_scale);
    body.put_u32(0); // duration, unknown for fragmented
    body.put_bytes(0, 80);
    full_box(b"mvhd", 0, &body)
}

fn mdhd(time_scale: u32) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(0);
    body.put_u32(0);
    body.put_u32(time_scale);
    body.put_u32(0);
    body.put_u16(0x55c4); // und
    body.put_u16(0);
    full_box(b"mdhd", 0, &body)
}

fn mvhd_v1(time_scale: u32, duration: u64) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u64(3_786_912_000); // 2024-01-01
    body.put_u64(3_786_912_000);
    body.put_u32(time_scale);
    body.put_u64(duration);
    body.put_bytes(0, 80);
    full_box(b"mvhd", 1, &body)
}

fn mdhd_v1(time_scale: u32, duration: u64) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u64(0);
    body.put_u64(0);
    body.put_u32(time_scale);
    body.put_u64(duration);
    body.put_u16(0x15c7); // eng
    body.put_u16(0);
    full_box(b"mdhd", 1, &body)
}

fn hdlr(handler: &[u8; 4]) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(0);
    body.put_slice(handler);
    body.put_bytes(0, 12);
    body.put_slice(b"handler\0");
    full_box(b"hdlr", 0, &body)
}

fn stsd(entry: &[u8]) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(1);
    body.put_slice(entry);
    full_box(b"stsd", 0, &body)
}

fn avcc() -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_slice(&[1, 0x64, 0x00, 0x1f, 0xff, 0xe1]);
    body.put_u16(SPS.len() as u16);
    body.put_slice(&SPS);
    body.put_u8(1);
    body.put_u16(PPS.len() as u16);
    body.put_slice(&PPS);
    boxed(b"avcC", &body)
}

fn avc1() -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_bytes(0, 6);
    body.put_u16(1); // data reference index
    body.put_u16(0); // version
    body.put_u16(0); // revision
    body.put_u32(0); // vendor
    body.put_u32(0); // temporal quality
    body.put_u32(0); // spatial quality
    body.put_u16(1280);
    body.put_u16(720);
    body.put_u16(72);
    body.put_u16(0);
    body.put_u16(72);
    body.put_u16(0);
    body.put_u32(0); // data size
    body.put_u16(1); // frame count
    let mut compressor = [0_u8; 32];
    compressor[0] = 4;
    compressor[1 .. 5].copy_from_slice(b"h264");
    body.put_slice(&compressor);
    body.put_u16(24);
    body.put_i16(-1);
    body.put_slice(&avcc());
    boxed(b"avc1", &body)
}

/// Tag, four byte base-128 length as written by most muxers, body.
fn descriptor(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u8(tag);
    buf.put_slice(&[0x80, 0x80, 0x80, body.len() as u8]);
    buf.put_slice(body);
    buf.to_vec()
}

fn esds() -> Vec<u8> {
    let specific = descriptor(5, &ASC);

    let mut config = BytesMut::new();
    config.put_u8(0x40); // MPEG-4 audio
    config.put_u8(0x15); // audio stream
    config.put_slice(&[0, 0x18, 0]); // buffer size
    config.put_u32(128_000);
    config.put_u32(96_000);
    config.put_slice(&specific);
    let config = descriptor(4, &config);

    let mut es = BytesMut::new();
    es.put_u16(1);
    es.put_u8(0);
    es.put_slice(&config);
    es.put_slice(&descriptor(6, &[2])); // SL config, not decoded

    full_box(b"esds", 0, &descriptor(3, &es))
}

fn mp4a() -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_bytes(0, 6);
    body.put_u16(1);
    body.put_u16(0);
    body.put_u16(0);
    body.put_u32(0);
    body.put_u16(2); // channels
    body.put_u16(16); // sample size
    body.put_u16(0);
    body.put_u16(0);
    body.put_u16(44100);
    body.put_u16(0);
    body.put_slice(&esds());
    boxed(b"mp4a", &body)
}

fn init_segment(handler: &[u8; 4], time_scale: u32, entry: &[u8]) -> Vec<u8> {
    let stbl = boxed(b"stbl", &stsd(entry));
    let minf = boxed(b"minf", &stbl);
    let mdia = boxed(b"mdia", &[mdhd(time_scale), hdlr(handler), minf].concat());
    let trak = boxed(b"trak", &mdia);
    let moov = boxed(b"moov", &[mvhd(time_scale), trak].concat());
    [boxed(b"ftyp", b"iso6\0\0\0\0iso6mp41"), moov].concat()
}

fn video_init(time_scale: u32) -> Vec<u8> {
    init_segment(b"vide", time_scale, &avc1())
}

fn audio_init(time_scale: u32) -> Vec<u8> {
    init_segment(b"soun", time_scale, &mp4a())
}

/// `samples` as `(duration, size)`.
fn trun(samples: &[(u32, u32)]) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(samples.len() as u32);
    body.put_u32(0); // data offset
    for (duration, size) in samples.iter() {
        body.put_u32(*duration);
        body.put_u32(*size);
        body.put_u32(0); // flags
        body.put_u32(0); // composition offset
    }
    full_box(b"trun", 0, &body)
}

fn tfdt(base: u64) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u64(base);
    full_box(b"tfdt", 1, &body)
}

fn tfdt_v0(base: u32) -> Vec<u8> {
    let mut body = BytesMut::new();
    body.put_u32(base);
    full_box(b"tfdt", 0, &body)
}

fn media_segment(base: u64, samples: &[(u32, u32)]) -> Vec<u8> {
    media_segment_with(&tfdt(base), samples)
}

fn media_segment_with(tfdt: &[u8], samples: &[(u32, u32)]) -> Vec<u8> {
    let traf = boxed(b"traf", &[full_box(b"tfhd", 0, &[0, 0, 0, 1]), tfdt.to_vec(), trun(samples)].concat());
    let moof = boxed(b"moof", &[full_box(b"mfhd", 0, &[0, 0, 0, 1]), traf].concat());
    let size: u32 = samples.iter().map(|(_, s)| s).sum();
    [moof, boxed(b"mdat", &vec![0; size.min(64) as usize])].concat()
}

fn parse(buf: &[u8]) -> BoxTree {
    let sps = NoSpsDecoder;
    BoxParser::new(&sps).parse(buf)
}

fn media_from(init: &[u8], segments: &[Vec<u8>], track: TrackType) -> TrackMediaInfo {
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(init), track);
    for segment in segments.iter() {
        let tree = parse(segment);
        for range in media.apply_moofs(&tree) {
            media.update_bitrate(range);
        }
    }
    media
}

fn frag(level: u32, sn: u64) -> FragmentRef {
    FragmentRef { level, sn, url: format!("seg{sn}.m4s") }
}

#[test]
fn read_big_endian() {
    let buf = [0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
    assert_eq!(read_big16(&buf, 0).unwrap(), 0x20);
    assert_eq!(read_big32(&buf, 4).unwrap(), 1);
    // exact above 2^53
    assert_eq!(read_big64(&buf, 0).unwrap(), (1_u64 << 53) + 1);
    assert!(read_big32(&buf, 6).is_err());
    assert!(read_big64(&buf, usize::MAX).is_err());
}

#[test]
fn read_string_best_effort() {
    assert_eq!(read_string(b"moov", 0, 4), "moov");
    assert_eq!(read_string(&[0xff, 0xfe, 0xfd, 0xfc], 0, 4), "");
    assert_eq!(read_string(b"moo", 0, 4), "");
}

#[test]
fn box_boundaries_round_trip() {
    let first = boxed(b"free", &[0; 8]);
    let second = boxed(b"skip", &[1; 24]);
    let buf = [first, second].concat();

    let a = box_info(&buf, 0).unwrap();
    assert_eq!(a.size(), 16);
    assert_eq!(a.header_size(), 8);
    assert_eq!(a.name(), &FourCC::from_str("free"));
    assert!(a.fully_loaded());

    let b = box_info(&buf, a.offset_next() as usize).unwrap();
    assert_eq!(b.offset(), 16);
    assert_eq!(b.size(), 32);
    assert_eq!(b.name().to_str(), "skip");
    assert_eq!(b.offset_next() as usize, buf.len());
    assert!(b.fully_loaded());
}

#[test]
fn extended_size() {
    let mut buf = BytesMut::new();
    buf.put_u32(1);
    buf.put_slice(b"mdat");
    buf.put_u64(40);
    buf.put_bytes(0xaa, 24);

    let info = box_info(&buf, 0).unwrap();
    assert_eq!(info.size(), 40);
    assert_eq!(info.header_size(), 16);
    assert_eq!(info.data_size(), 24);
    assert_eq!(info.data_offset(), 16);
    assert_eq!(info.name(), &FourCC::Mdat);
    assert!(info.fully_loaded());

    let mut huge = BytesMut::new();
    huge.put_u32(1);
    huge.put_slice(b"mdat");
    huge.put_u64(u64::MAX);
    let info = box_info(&huge, 0).unwrap();
    assert_eq!(info.size(), u64::MAX);
    assert!(!info.fully_loaded());
}

#[test]
fn extended_size_container() {
    let inner = mvhd(90000);
    let mut buf = BytesMut::new();
    buf.put_u32(1);
    buf.put_slice(b"moov");
    buf.put_u64(16 + inner.len() as u64);
    buf.put_slice(&inner);

    let tree = parse(&buf);
    let mvhd = tree.first(&FourCC::Moov).and_then(|m| m.mvhd());
    assert_eq!(mvhd.map(|m| m.time_scale()), Some(90000));
}

#[test]
fn zero_size_box() {
    let mut buf = BytesMut::new();
    buf.put_u32(0);
    buf.put_slice(b"free");
    let info = box_info(&buf, 0).unwrap();
    assert_eq!(info.size(), 8);
    assert_eq!(info.header_size(), 8);
    assert!(info.fully_loaded());

    // scan moves past it
    buf.put_slice(&boxed(b"moov", &mvhd(1000)));
    let tree = parse(&buf);
    assert!(tree.first(&FourCC::Moov).is_some());
}

#[test]
fn malformed_and_truncated_boxes() {
    // declared size smaller than header
    let mut buf = BytesMut::new();
    buf.put_u32(4);
    buf.put_slice(b"moov");
    buf.put_bytes(0, 32);
    assert!(!box_info(&buf, 0).unwrap().fully_loaded());
    assert!(parse(&buf).is_empty());

    // extended size smaller than the 16 byte header
    let mut ext = BytesMut::new();
    ext.put_u32(1);
    ext.put_slice(b"mdat");
    ext.put_u64(12);
    ext.put_bytes(0, 16);
    let info = box_info(&ext, 0).unwrap();
    assert!(info.is_malformed());
    assert!(!info.fully_loaded());

    // declared size past end of buffer
    let mut moov = boxed(b"moov", &mvhd(1000));
    moov.truncate(moov.len() - 10);
    assert!(parse(&moov).is_empty());

    // header cut short
    assert!(box_info(&[0, 0, 0], 0).is_err());
    assert!(parse(&[0, 0, 0, 16, b'm']).is_empty());
}

#[test]
fn unknown_boxes_skipped() {
    let buf = [
        boxed(b"styp", b"msdh\0\0\0\0msdhmsix"),
        boxed(b"sidx", &[0; 24]),
        boxed(b"moov", &mvhd(1000)),
    ].concat();
    let tree = parse(&buf);
    assert_eq!(tree.names(), vec![FourCC::Moov]);
    assert!(tree.first(&FourCC::Moov).and_then(|m| m.mvhd()).is_some());
}

#[test]
fn video_init_tree() {
    let tree = parse(&video_init(90000));

    let moov = tree.first(&FourCC::Moov).unwrap();
    assert_eq!(moov.mvhd().unwrap().time_scale(), 90000);

    let mdia = tree.path(&STSD[.. 3]).unwrap();
    assert_eq!(mdia.mdhd().unwrap().time_scale(), 90000);
    assert_eq!(mdia.mdhd().unwrap().language(), "und");
    assert_eq!(mdia.hdlr().unwrap().handler(), "vide");

    let stsd = tree.path(&STSD).unwrap();
    let avc1 = stsd.avc1().unwrap();
    assert_eq!(avc1.width(), 1280);
    assert_eq!(avc1.height(), 720);
    assert_eq!(avc1.horizontal_resolution(), 72.0);
    assert_eq!(avc1.compressor_name(), "h264");
    assert_eq!(avc1.depth(), 24);

    let avcc = avc1.extensions().avcc().unwrap();
    assert_eq!(avcc.nal_length_size(), 4);
    assert_eq!(avcc.sps().len(), 1);
    assert_eq!(avcc.pps_count(), 1);
    assert_eq!(avcc.sps_records()[0].codec_string(), "avc1.64001f");
    assert_eq!(avcc.sps_records()[0].nal(), &SPS);
    assert!(avcc.sps_records()[0].info().is_none());
}

#[test]
fn codec_string_from_bytes() {
    assert_eq!(avc_codec_string(0x64, 0x00, 0x1f), "avc1.64001f");
    assert_eq!(avc_codec_string(0x42, 0xc0, 0x0a), "avc1.42c00a");
}

#[test]
fn descriptor_lengths() {
    assert_eq!(descriptor_length(&[0x22], 0).unwrap(), (0x22, 1));
    assert_eq!(descriptor_length(&[0x80, 0x80, 0x80, 0x22], 0).unwrap(), (0x22, 4));
    assert_eq!(descriptor_length(&[0x81, 0x01], 0).unwrap(), (129, 2));
    assert!(descriptor_length(&[0x80], 0).is_err());
}

#[test]
fn audio_init_tree() {
    let tree = parse(&audio_init(44100));
    let mp4a = tree.path(&STSD).unwrap().mp4a().unwrap();
    assert_eq!(mp4a.channels(), 2);
    assert_eq!(mp4a.sample_size(), 16);
    assert_eq!(mp4a.sample_rate(), 44100);

    let esds = mp4a.extensions().esds().unwrap();
    assert_eq!(esds.es_descriptor().unwrap().es_id(), 1);

    let config = esds.decoder_config().unwrap();
    assert_eq!(config.object_type_indication(), 0x40);
    assert_eq!(config.stream_type(), 0x15);
    assert_eq!(config.buffer_size(), 0x1800);
    assert_eq!(config.max_bitrate(), 128_000);
    assert_eq!(config.avg_bitrate(), 96_000);

    let specific = esds.decoder_specific().unwrap();
    assert_eq!(specific.data(), &ASC);
    assert_eq!(specific.audio_object_type(), 2);
    assert_eq!(specific.sampling_index(), 4);
    assert_eq!(specific.channel_config(), 2);
}

#[test]
fn sampling_frequency_table() {
    assert_eq!(sample_rate(4), Some(44100));
    assert_eq!(sample_rate(12), Some(8000));
    assert_eq!(sample_rate(3), Some(48000));
    assert_eq!(sample_rate(13), None);
    assert_eq!(sample_rate(15), None);
}

#[test]
fn sample_tables() {
    let mut stts = BytesMut::new();
    stts.put_u32(1);
    stts.put_u32(30);
    stts.put_u32(3000);

    let mut stss = BytesMut::new();
    stss.put_u32(2);
    stss.put_u32(1);
    stss.put_u32(31);

    let mut ctts = BytesMut::new();
    ctts.put_u32(2);
    ctts.put_u32(1);
    ctts.put_u32(0);
    ctts.put_u32(2);
    ctts.put_u32(1024);

    let mut stsc = BytesMut::new();
    stsc.put_u32(1);
    stsc.put_u32(1);
    stsc.put_u32(30);
    stsc.put_u32(1);

    let mut co64 = BytesMut::new();
    co64.put_u32(1);
    co64.put_u64(1_u64 << 40);

    let mut stsz = BytesMut::new();
    stsz.put_u32(0);
    stsz.put_u32(2);
    stsz.put_u32(700);
    stsz.put_u32(500);

    let stbl = boxed(b"stbl", &[
        full_box(b"stts", 0, &stts),
        full_box(b"ctts", 0, &ctts),
        full_box(b"stsc", 0, &stsc),
        full_box(b"stss", 0, &stss),
        full_box(b"stsz", 0, &stsz),
        full_box(b"co64", 0, &co64),
    ].concat());
    let tree = parse(&stbl);
    let stbl = tree.first(&FourCC::Stbl).unwrap();

    assert_eq!(stbl.stts().unwrap().duration_sum(), 90000);

    let ctts = stbl.ctts().unwrap();
    assert_eq!(ctts.len(), 2);
    assert_eq!(ctts.table()[1].sample_count(), 2);
    assert_eq!(ctts.table()[1].composition_offset(), 1024);

    let stsc = stbl.stsc().unwrap();
    assert_eq!(stsc.len(), 1);
    assert_eq!(stsc.table()[0].first_chunk(), 1);
    assert_eq!(stsc.table()[0].samples_per_chunk(), 30);
    assert_eq!(stsc.table()[0].sample_description_id(), 1);

    assert_eq!(stbl.stss().unwrap().sync_samples(), &[1, 31]);
    assert_eq!(stbl.stsz().unwrap().sizes(), &[700, 500]);
    // co64 stored as stco
    assert_eq!(stbl.stco().unwrap().offsets(), &[1_u64 << 40]);
}

#[test]
fn oversized_table_count_skipped() {
    let mut stts = BytesMut::new();
    stts.put_u32(1_000_000);
    stts.put_u32(1);
    stts.put_u32(1);

    let mut stco = BytesMut::new();
    stco.put_u32(2);
    stco.put_u32(48);
    stco.put_u32(1048);

    let stbl = boxed(b"stbl", &[
        full_box(b"stts", 0, &stts),
        full_box(b"stco", 0, &stco),
    ].concat());
    let tree = parse(&stbl);
    let stbl = tree.first(&FourCC::Stbl).unwrap();

    assert!(stbl.stts().is_none());
    assert_eq!(stbl.stco().unwrap().offsets(), &[48, 1048]);
}

#[test]
fn fragment_tree() {
    let tree = parse(&media_segment(9000, &[(3000, 10), (3000, 20)]));
    let traf = tree.path(&[FourCC::Moof, FourCC::Traf]).unwrap();
    assert_eq!(traf.tfdt().unwrap().base_media_decode_time(), 9000);

    let trun = traf.trun().unwrap();
    assert_eq!(trun.sample_count(), 2);
    assert_eq!(trun.durations(), vec![3000, 3000]);
    assert_eq!(trun.sizes(), vec![10, 20]);
    assert_eq!(trun.duration_sum(), 6000);
}

#[test]
fn version_1_headers_and_version_0_tfdt() {
    let mdia = boxed(b"mdia", &mdhd_v1(48000, 1_u64 << 33));
    let trak = boxed(b"trak", &mdia);
    let moov = boxed(b"moov", &[mvhd_v1(90000, (1_u64 << 32) + 90000), trak].concat());
    let tree = parse(&moov);
    let moov = tree.first(&FourCC::Moov).unwrap();

    let mvhd = moov.mvhd().unwrap();
    assert_eq!(mvhd.version(), 1);
    assert_eq!(mvhd.time_scale(), 90000);
    assert_eq!(mvhd.duration_unscaled(), (1_u64 << 32) + 90000);
    assert_eq!(mvhd.creation_time().map(|t| t.year()), Some(2024));

    let mdhd = moov.path(&[FourCC::Trak, FourCC::Mdia]).and_then(|m| m.mdhd()).unwrap();
    assert_eq!(mdhd.version(), 1);
    assert_eq!(mdhd.time_scale(), 48000);
    assert_eq!(mdhd.duration(), 1_u64 << 33);
    assert_eq!(mdhd.language(), "eng");

    let segment = media_segment_with(&tfdt_v0(60), &[(30, 100), (30, 200)]);
    let tree = parse(&segment);
    let tfdt = tree.path(&[FourCC::Moof, FourCC::Traf]).and_then(|t| t.tfdt()).unwrap();
    assert_eq!(tfdt.version(), 0);
    assert_eq!(tfdt.base_media_decode_time(), 60);

    let media = media_from(&video_init(30), &[segment], TrackType::Video);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(2, 100), (3, 200)]));
}

#[test]
fn fragment_at_end_of_time() {
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(&video_init(1)), TrackType::Video);

    let ranges = media.apply_moofs(&parse(&media_segment(u64::MAX, &[(1, 10)])));
    assert_eq!(ranges, vec![u64::MAX .. u64::MAX]);
    assert_eq!(media.samples().get(u64::MAX), Some(10));

    for range in ranges {
        media.update_bitrate(range);
    }
    assert!(media.bitrate_map().is_empty());
}

#[test]
fn long_sample_keeps_histograms_sparse() {
    let sps = NoSpsDecoder;
    let parser = BoxParser::new(&sps);
    let mut ledger = MediaLedger::new();

    ledger.ingest(0, TrackType::Video, &video_init(1000), &parser);
    let ranges = ledger.ingest(0, TrackType::Video, &media_segment(0, &[(u32::MAX, 10)]), &parser);
    assert_eq!(ranges, vec![0 .. 4_294_968]);

    ledger.merge(&HashMap::from([(0, ranges)]));
    let level = ledger.get(0).unwrap();
    assert_eq!(level.video().bitrate_map(), &BTreeMap::from([(0, 10)]));
    assert_eq!(level.bitrate_map(), &BTreeMap::from([(0, 0.08)]));
}

#[test]
fn trun_ledger_and_histogram() {
    let init = video_init(30);
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(&init), TrackType::Video);
    assert_eq!(media.time_scale(), 30);

    let tree = parse(&media_segment(0, &[(10, 100), (10, 200), (10, 300)]));
    let ranges = media.apply_moofs(&tree);
    assert_eq!(ranges, vec![0 .. 1]);

    let ledger: Vec<(u64, u32)> = media.samples().iter().collect();
    assert_eq!(ledger, vec![(0, 100), (10, 200), (20, 300)]);

    media.update_bitrate(0 .. 1);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(0, 600)]));
    assert_eq!(media.total_size(), 600);
    assert_eq!(media.total_duration(), 30);
}

#[test]
fn duplicate_fragment_is_idempotent() {
    let segment = media_segment(0, &[(10, 100), (10, 200), (10, 300)]);
    let once = media_from(&video_init(30), &[segment.to_owned()], TrackType::Video);
    let twice = media_from(&video_init(30), &[segment.to_owned(), segment], TrackType::Video);

    assert_eq!(once.total_size(), twice.total_size());
    assert_eq!(once.total_duration(), twice.total_duration());
    assert_eq!(once.average_bitrate(), twice.average_bitrate());
    assert_eq!(once.samples(), twice.samples());
    assert_eq!(once.bitrate_map(), twice.bitrate_map());

    // first writer wins for a re-delivered timestamp
    let mut media = once;
    let tree = parse(&media_segment(10, &[(10, 999)]));
    media.apply_moofs(&tree);
    assert_eq!(media.samples().get(10), Some(200));
    assert_eq!(media.total_size(), 600);
}

#[test]
fn average_bitrate_after_each_fragment() {
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(&video_init(90000)), TrackType::Video);

    let fragments = [
        media_segment(0, &[(3000, 12_000), (3000, 4_000), (3000, 4_500)]),
        media_segment(9000, &[(3000, 11_000), (3003, 3_900)]),
        media_segment(15003, &[(2997, 5_100)]),
    ];

    for fragment in fragments.iter() {
        media.apply_moofs(&parse(fragment));
        let expected = media.total_size() as f64 * 90000. / media.total_duration() as f64 * 8.;
        assert_eq!(media.average_bitrate(), expected);
    }
    assert_eq!(media.total_duration(), 18000);
    assert_eq!(media.total_size(), 40_500);
    assert_eq!(media.duration(), time::Duration::seconds_f64(0.2));
}

#[test]
fn range_end_at_second_boundary() {
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(&video_init(30)), TrackType::Video);

    // sample at 30 belongs to second 1, fragment end 40 rounds up to 2
    let ranges = media.apply_moofs(&parse(&media_segment(20, &[(10, 100), (10, 200)])));
    assert_eq!(ranges, vec![0 .. 2]);
    media.update_bitrate(0 .. 2);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(0, 100), (1, 200)]));

    // ends exactly on a boundary
    let ranges = media.apply_moofs(&parse(&media_segment(40, &[(10, 50), (10, 50)])));
    assert_eq!(ranges, vec![1 .. 2]);
    media.update_bitrate(1 .. 2);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(0, 100), (1, 300)]));

    // zero duration samples still touch their second
    let ranges = media.apply_moofs(&parse(&media_segment(90, &[(0, 7)])));
    assert_eq!(ranges, vec![3 .. 4]);
}

#[test]
fn update_bitrate_only_touches_range() {
    let segments = [
        media_segment(0, &[(30, 100)]),
        media_segment(30, &[(30, 200)]),
    ];
    let mut media = media_from(&video_init(30), &segments, TrackType::Video);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(0, 100), (1, 200)]));

    media.bitrate_map.insert(0, 1);
    media.update_bitrate(1 .. 2);
    assert_eq!(media.bitrate_map(), &BTreeMap::from([(0, 1), (1, 200)]));
}

#[test]
fn fragment_missing_boxes() {
    let mut media = TrackMediaInfo::default();
    media.apply_moov(&parse(&video_init(30)), TrackType::Video);

    let no_trun = boxed(b"moof", &boxed(b"traf", &tfdt(0)));
    let no_tfdt = boxed(b"moof", &boxed(b"traf", &trun(&[(10, 100)])));
    let no_traf = boxed(b"moof", &full_box(b"mfhd", 0, &[0, 0, 0, 1]));

    for buf in [no_trun, no_tfdt, no_traf].iter() {
        assert!(media.apply_moofs(&parse(buf)).is_empty());
    }
    assert!(media.samples().is_empty());
    assert_eq!(media.total_size(), 0);
}

#[test]
fn fragment_before_init() {
    let mut media = TrackMediaInfo::default();
    let ranges = media.apply_moofs(&parse(&media_segment(0, &[(10, 100)])));
    assert!(ranges.is_empty());
    assert_eq!(media.samples().len(), 1);
    assert_eq!(media.average_bitrate(), 0.);
}

#[test]
fn video_info_from_sps_decoder() {
    let decoder = |nal: &[u8]| -> Option<SpsInfo> {
        (nal.first() == Some(&0x67)).then(|| SpsInfo {
            width: 1920,
            height: 1080,
            fps: 25.,
            profile: "High".to_owned(),
            level: "3.1".to_owned(),
            chroma_format: "4:2:0".to_owned(),
            sar_width: 1,
            sar_height: 1,
        })
    };
    let tree = BoxParser::new(&decoder).parse(&video_init(90000));

    let mut media = TrackMediaInfo::default();
    media.apply_moov(&tree, TrackType::Video);
    let video = media.video().unwrap();
    assert_eq!(video.codec, "avc1.64001f");
    assert_eq!((video.width, video.height), (1920, 1080));
    assert_eq!(video.fps, 25.);
    assert_eq!(video.profile, "High");
    assert_eq!(video.level, "3.1");
    assert_eq!(video.chroma_format, "4:2:0");
    assert_eq!(video.sar, (1, 1));
    assert!(media.audio().is_none());

    // undecodable SPS falls back to sample entry dimensions
    let media = media_from(&video_init(90000), &[], TrackType::Video);
    let video = media.video().unwrap();
    assert_eq!((video.width, video.height), (1280, 720));
    assert_eq!(video.fps, 0.);
}

#[test]
fn audio_info_from_esds() {
    let media = media_from(&audio_init(44100), &[], TrackType::Audio);
    assert_eq!(media.time_scale(), 44100);
    let audio = media.audio().unwrap();
    assert_eq!(audio.codec, "mp4a.40.2");
    assert_eq!(audio.sample_rate, Some(44100));
    assert_eq!(audio.channels, 2);
}

#[test]
fn merge_combined_kbps() {
    let mut level = LevelMediaInfo::new(3);
    level.video.bitrate_map = BTreeMap::from([(0, 600), (1, 1000)]);
    level.audio.bitrate_map = BTreeMap::from([(0, 100), (2, 250)]);
    level.merge_bitrate(0 .. 3);

    assert_eq!(level.bitrate_map().get(&0), Some(&(700. * 8. / 1000.)));
    assert_eq!(level.bitrate_map().get(&1), Some(&8.));
    assert_eq!(level.bitrate_map().get(&2), Some(&2.));
    assert_eq!(level.bitrate_map().len(), 3);

    // seconds without bytes read as zero and are not stored
    level.merge_bitrate(0 .. 10);
    assert_eq!(level.bitrate_map().len(), 3);
    assert_eq!(level.bitrate_map().get(&7), None);
}

#[test]
fn observer_end_to_end() {
    let mut hub = EventHub::new();
    let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), Config::default());
    assert_eq!(hub.len(), 1);

    hub.emit(PlayerEvent::LevelSwitching { level: 2 });
    for (track, buf) in [
        (TrackType::Video, video_init(30)),
        (TrackType::Video, media_segment(0, &[(10, 100), (10, 200), (10, 300)])),
        (TrackType::Audio, audio_init(1000)),
        (TrackType::Audio, media_segment(0, &[(500, 50), (500, 50)])),
    ] {
        hub.emit(PlayerEvent::BufferAppending { track, data: Bytes::from(buf) });
    }
    hub.emit(PlayerEvent::LevelSwitched { level: 2 });

    assert_eq!(observer.tick(), 4);
    assert_eq!(observer.pending_len(), 0);

    let level = observer.level(2).unwrap();
    assert_eq!(level.level_id(), 2);
    assert_eq!(level.video().bitrate_map(), &BTreeMap::from([(0, 600)]));
    assert_eq!(level.audio().bitrate_map(), &BTreeMap::from([(0, 100)]));
    assert_eq!(level.bitrate_map(), &BTreeMap::from([(0, 700. * 8. / 1000.)]));
    assert_eq!(level.audio().audio().unwrap().codec, "mp4a.40.2");

    assert_eq!(observer.current_level(), Some(2));
    assert_eq!(observer.current(), Some(level));

    let json = serde_json::to_value(observer.current().unwrap()).unwrap();
    assert_eq!(json["level_id"], 2);
    assert!(json["video"].get("samples").is_none());

    observer.shutdown(&mut hub);
    assert!(hub.is_empty());
}

#[test]
fn empty_drain_changes_nothing() {
    let mut hub = EventHub::new();
    let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), Config::default());

    hub.emit(PlayerEvent::LevelSwitched { level: 0 });
    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(video_init(30)) });
    hub.emit(PlayerEvent::BufferAppending {
        track: TrackType::Video,
        data: Bytes::from(media_segment(0, &[(30, 1000)])),
    });
    assert_eq!(observer.tick(), 2);

    let before = observer.levels().to_owned();
    assert_eq!(observer.tick(), 0);
    assert_eq!(observer.levels(), &before);
}

/// Hands its subscriber's sender to whoever holds the slot.
#[derive(Default)]
struct Relay {
    slot: Arc<Mutex<Option<Sender<PlayerEvent>>>>,
}

impl NotificationSource for Relay {
    fn subscribe(&mut self, sender: Sender<PlayerEvent>) -> SubscriptionId {
        *self.slot.lock().unwrap() = Some(sender);
        SubscriptionId(0)
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        self.slot.lock().unwrap().take();
    }
}

#[test]
fn events_during_drain_are_included() {
    let mut relay = Relay::default();
    let slot = Arc::clone(&relay.slot);
    // Emits a media segment while the init segment is being parsed.
    let decoder = move |_nal: &[u8]| -> Option<SpsInfo> {
        if let Some(sender) = slot.lock().unwrap().take() {
            let data = Bytes::from(media_segment(0, &[(10, 100), (10, 200), (10, 300)]));
            sender.send(PlayerEvent::BufferAppending { track: TrackType::Video, data }).unwrap();
        }
        None
    };
    let mut observer = MediaInfoObserver::attach(&mut relay, Box::new(decoder), Config::default());

    {
        let slot = relay.slot.lock().unwrap();
        let sender = slot.as_ref().unwrap();
        sender.send(PlayerEvent::LevelSwitching { level: 0 }).unwrap();
        sender.send(PlayerEvent::BufferAppending {
            track: TrackType::Video,
            data: Bytes::from(video_init(30)),
        }).unwrap();
    }

    assert_eq!(observer.tick(), 2);
    assert_eq!(observer.pending_len(), 0);
    let level = observer.level(0).unwrap();
    assert_eq!(level.video().bitrate_map(), &BTreeMap::from([(0, 600)]));
    assert_eq!(level.bitrate_map(), &BTreeMap::from([(0, 4.8)]));
}

#[test]
fn appends_are_drained_in_order_per_level() {
    let mut hub = EventHub::new();
    let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), Config::default());

    hub.emit(PlayerEvent::LevelSwitching { level: 0 });
    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(video_init(30)) });
    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(media_segment(0, &[(30, 100)])) });
    hub.emit(PlayerEvent::LevelSwitching { level: 1 });
    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(video_init(30)) });
    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(media_segment(30, &[(30, 400)])) });

    assert_eq!(observer.tick(), 4);
    assert_eq!(observer.levels().len(), 2);
    assert_eq!(observer.level(0).unwrap().bitrate_map(), &BTreeMap::from([(0, 0.8)]));
    assert_eq!(observer.level(1).unwrap().bitrate_map(), &BTreeMap::from([(1, 3.2)]));
    // only switching seen so far
    assert!(observer.current().is_none());
}

#[test]
fn appends_before_level_switch_dropped() {
    let mut hub = EventHub::new();
    let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), Config::default());

    hub.emit(PlayerEvent::BufferAppending { track: TrackType::Video, data: Bytes::from(video_init(30)) });
    assert_eq!(observer.tick(), 0);
    assert!(observer.levels().is_empty());
}

#[test]
fn download_speed_and_progress() {
    let mut hub = EventHub::new();
    let config = Config::from_json(r#"{"tick_interval_ms": 500}"#).unwrap();
    let mut observer = MediaInfoObserver::attach(&mut hub, Box::new(NoSpsDecoder), config);
    let progress = observer.subscribe_progress();

    hub.emit(PlayerEvent::FragLoading { frag: frag(0, 1), stats: LoadStats { loaded: 0, total: 1000 } });
    hub.emit(PlayerEvent::FragLoadProgress { frag: frag(0, 1), stats: LoadStats { loaded: 500, total: 1000 } });
    observer.tick();
    // 500 bytes in half a second
    assert_eq!(observer.download_speed(), 1000.);

    hub.emit(PlayerEvent::FragLoaded { frag: frag(0, 1), stats: LoadStats { loaded: 1000, total: 1000 } });
    observer.tick();
    assert_eq!(observer.download_speed(), 1000.);

    observer.tick();
    assert_eq!(observer.download_speed(), 0.);

    let ratios: Vec<f64> = progress.try_iter().collect();
    assert_eq!(ratios, vec![0., 0.5, 0.]);
}

#[test]
fn load_stats_ratio() {
    assert_eq!(LoadStats { loaded: 10, total: 0 }.ratio(), 0.);
    assert_eq!(LoadStats { loaded: 25, total: 100 }.ratio(), 0.25);
    assert_eq!(LoadStats { loaded: 200, total: 100 }.ratio(), 1.);
}

#[test]
fn hub_subscriptions() {
    let mut hub = EventHub::new();
    let (tx1, rx1) = unbounded();
    let (tx2, rx2) = unbounded();
    let id1 = hub.subscribe(tx1);
    let _id2 = hub.subscribe(tx2);

    hub.emit(PlayerEvent::LevelSwitched { level: 1 });
    hub.unsubscribe(id1);
    hub.emit(PlayerEvent::LevelSwitched { level: 2 });

    assert_eq!(rx1.try_iter().count(), 1);
    assert_eq!(rx2.try_iter().count(), 2);

    drop(rx2);
    hub.emit(PlayerEvent::LevelSwitched { level: 3 });
    assert!(hub.is_empty());
}

#[test]
fn observers_are_independent() {
    let mut hub_a = EventHub::new();
    let mut hub_b = EventHub::new();
    let mut a = MediaInfoObserver::attach(&mut hub_a, Box::new(NoSpsDecoder), Config::default());
    let mut b = MediaInfoObserver::attach(&mut hub_b, Box::new(NoSpsDecoder), Config::default());

    hub_a.emit(PlayerEvent::LevelSwitched { level: 5 });
    a.tick();
    b.tick();
    assert!(a.level(5).is_some());
    assert!(b.levels().is_empty());
}

#[test]
fn config_defaults_and_validation() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    assert_eq!(Config::default().tick_interval_ms, 1000);
    assert!(Config::from_json(r#"{"tick_interval_ms": 0}"#).is_err());
    assert!(Config::from_json("not json").is_err());
    assert_eq!(
        Config::load_or_default(std::path::Path::new("/nonexistent/mp4levelinfo.json")),
        Config::default()
    );
}

#[test]
fn track_type_names() {
    assert_eq!("video".parse::<TrackType>().unwrap(), TrackType::Video);
    assert_eq!("audio".parse::<TrackType>().unwrap(), TrackType::Audio);
    assert!("subtitles".parse::<TrackType>().is_err());
    assert_eq!(serde_json::to_string(&TrackType::Audio).unwrap(), "\"audio\"");
}

#[test]
fn track_header_fixed_point() {
    let mut body = BytesMut::new();
    body.put_u32(0); // creation
    body.put_u32(0); // modification
    body.put_u32(1); // track id
    body.put_u32(0);
    body.put_u32(90000); // duration
    body.put_bytes(0, 8);
    body.put_u16(0); // layer
    body.put_u16(1); // alternate group
    body.put_u16(0x0100); // volume
    body.put_u16(0);
    body.put_bytes(0, 36); // matrix
    body.put_u16(1280);
    body.put_u16(0);
    body.put_u16(720);
    body.put_u16(5);

    let mut payload = BytesMut::new();
    payload.put_slice(&[0, 0, 0, 0x03]);
    payload.put_slice(&body);
    let tree = parse(&boxed(b"trak", &boxed(b"tkhd", &payload)));
    let tkhd = tree.first(&FourCC::Trak).and_then(|t| t.tkhd()).unwrap();

    assert!(tkhd.flags().enabled);
    assert!(tkhd.flags().in_movie);
    assert!(!tkhd.flags().in_preview);
    assert_eq!(tkhd.track_id(), 1);
    assert_eq!(tkhd.duration(), 90000);
    assert_eq!(tkhd.alternate_group(), 1);
    assert_eq!(tkhd.volume(), 1.0);
    assert_eq!(tkhd.width(), 1280.0);
    // fraction joined as decimal text
    assert_eq!(tkhd.height(), 720.5);
}
