use anyhow::{Context, Result};
use log::{info, warn};
use satz::{record, ByteOrder, Codec, CodecError};
use serde::Serialize;
use structopt::StructOpt;

/// Encode a sample telemetry record or decode one
#[derive(StructOpt)]
#[structopt(name = "satz-example", author = "Liv Fischer")]
struct Opt {
    /// use big endian byte order instead of little endian
    #[structopt(short, long)]
    big_endian: bool,
    /// decode the given base64 record instead of encoding the sample
    #[structopt(short, long)]
    decode: Option<String>,
}

record! {
    #[derive(Debug, Serialize)]
    struct Telemetry {
        station: u16,
        #[satz("length:12")]
        name: String,
        #[satz("length:4")]
        readings: Vec<f32>,
        battery: Option<u8>,
        position: [i32; 2],
        /// Set by the receiver, never transmitted
        #[satz("-")]
        received_at: u64,
        online: bool,
        #[satz("codec:write_checksum:read_checksum")]
        checksum: u8,
    }
    codecs {
        encode: [write_checksum],
        decode: [read_checksum],
    }
}

impl Telemetry {

    fn expected_checksum(&self) -> u8 {
        self.name.bytes().chain(self.station.to_le_bytes()).fold(0, |acc, b| acc ^ b)
    }

    fn write_checksum(&self) -> Result<Vec<u8>, CodecError> {
        Ok(vec![self.expected_checksum()])
    }

    fn read_checksum(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
        let stored = *bytes.first().ok_or("missing checksum")?;
        let expected = self.expected_checksum();
        if stored != expected {
            return Err(format!("stored checksum {:#04x} does not match {:#04x}", stored, expected).into());
        }
        self.checksum = stored;
        Ok(1)
    }

}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();
    let order = if opt.big_endian { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
    info!("using byte order {}", serde_json::to_string(&order)?);
    let codec = Codec::new();
    match opt.decode {
        Some(input) => decode(&codec, &input, order),
        None => encode(&codec, order),
    }
}

fn encode(codec: &Codec, order: ByteOrder) -> Result<()> {
    let sample = Telemetry {
        station: 4711,
        name: "Zugspitze".to_owned(),
        readings: vec![-3.5, -4.25, 1.0],
        battery: Some(87),
        position: [47_421_100, 10_985_300],
        received_at: 1_700_000_000,
        online: true,
        checksum: 0,
    };
    let bytes = codec.encode(&sample, order).context("Encoding error")?;
    let json = serde_json::to_vec(&sample).context("Failed to serialize to json")?;
    println!("{}", base64::encode(&bytes));
    info!("satz: {} bytes, json: {} bytes", bytes.len(), json.len());
    Ok(())
}

fn decode(codec: &Codec, input: &str, order: ByteOrder) -> Result<()> {
    let bytes = base64::decode(input.trim()).context("input is not base64")?;
    let (telemetry, consumed) = codec.decode_new::<Telemetry>(&bytes, order).context("Decoding error")?;
    if consumed < bytes.len() {
        warn!("ignoring {} trailing bytes", bytes.len() - consumed);
    }
    println!("{}", serde_json::to_string_pretty(&telemetry)?);
    Ok(())
}
