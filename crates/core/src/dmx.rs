use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use artnet_protocol::{ArtCommand, Output, PortAddress};

pub const UNIVERSE_SIZE: usize = 512;

/// Sink for finalized per-channel values. `stage` collects values during the
/// render pass; `submit` pushes one frame to the wire. A failed submit is
/// reported to the caller, who logs it and retries naturally on the next
/// tick; it must never take down the tick loop.
pub trait DmxOutput {
    fn stage(&mut self, universe: u8, start_address: u16, values: &[u8]);
    fn submit(&mut self) -> anyhow::Result<()>;
}

/// In-memory DMX universes. Doubles as the staging buffer for the Art-Net
/// sender and as the output target in tests.
#[derive(Default)]
pub struct UniverseBuffer {
    universes: HashMap<u8, [u8; UNIVERSE_SIZE]>,
}

impl UniverseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn universe(&self, universe: u8) -> Option<&[u8; UNIVERSE_SIZE]> {
        self.universes.get(&universe)
    }

    /// Read one channel by its 1-based DMX address.
    pub fn channel(&self, universe: u8, address: u16) -> u8 {
        let Some(index) = (address as usize).checked_sub(1) else {
            return 0;
        };
        self.universes
            .get(&universe)
            .and_then(|data| data.get(index))
            .copied()
            .unwrap_or(0)
    }

    pub fn write(&mut self, universe: u8, start_address: u16, values: &[u8]) {
        let data = self.universes.entry(universe).or_insert([0; UNIVERSE_SIZE]);
        let start = start_address.saturating_sub(1) as usize;
        for (offset, value) in values.iter().enumerate() {
            if let Some(slot) = data.get_mut(start + offset) {
                *slot = *value;
            }
        }
    }

    pub fn universes(&self) -> impl Iterator<Item = (&u8, &[u8; UNIVERSE_SIZE])> {
        self.universes.iter()
    }
}

impl DmxOutput for UniverseBuffer {
    fn stage(&mut self, universe: u8, start_address: u16, values: &[u8]) {
        self.write(universe, start_address, values);
    }

    fn submit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Where Art-Net frames go.
#[derive(Clone, Debug)]
pub enum ArtNetMode {
    Broadcast,
    /// Source and destination socket addresses.
    Unicast(SocketAddr, SocketAddr),
}

/// Art-Net sender: stages into a universe buffer and emits one `ArtDmx`
/// packet per staged universe on submit.
pub struct ArtNetOutput {
    socket: UdpSocket,
    destination: SocketAddr,
    buffer: UniverseBuffer,
    frames_sent: u64,
}

impl ArtNetOutput {
    pub fn new(mode: ArtNetMode, port: u16) -> anyhow::Result<Self> {
        let (socket, destination) = match mode {
            ArtNetMode::Broadcast => {
                let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
                socket.set_broadcast(true)?;
                (socket, SocketAddr::from((Ipv4Addr::BROADCAST, port)))
            }
            ArtNetMode::Unicast(source, destination) => {
                let socket = UdpSocket::bind(source)?;
                (socket, destination)
            }
        };
        socket.set_nonblocking(true)?;
        log::info!("art-net output ready, destination {}", destination);
        Ok(ArtNetOutput {
            socket,
            destination,
            buffer: UniverseBuffer::new(),
            frames_sent: 0,
        })
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}

impl DmxOutput for ArtNetOutput {
    fn stage(&mut self, universe: u8, start_address: u16, values: &[u8]) {
        self.buffer.write(universe, start_address, values);
    }

    fn submit(&mut self) -> anyhow::Result<()> {
        for (universe, data) in self.buffer.universes() {
            let port_address = PortAddress::try_from(*universe as u16)
                .map_err(|e| anyhow::anyhow!("bad universe {}: {:?}", universe, e))?;
            let command = ArtCommand::Output(Output {
                port_address,
                data: data.to_vec().into(),
                ..Output::default()
            });
            let packet = command
                .write_to_buffer()
                .map_err(|e| anyhow::anyhow!("art-net encode failed: {:?}", e))?;
            self.socket.send_to(&packet, self.destination)?;
        }
        self.frames_sent += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_stage_is_one_based() {
        let mut buffer = UniverseBuffer::new();
        buffer.stage(1, 1, &[10, 20, 30]);
        assert_eq!(buffer.channel(1, 1), 10);
        assert_eq!(buffer.channel(1, 3), 30);
        assert_eq!(buffer.channel(1, 4), 0);
    }

    #[test]
    fn test_buffer_ignores_overflow_past_universe_end() {
        let mut buffer = UniverseBuffer::new();
        buffer.stage(1, (UNIVERSE_SIZE - 1) as u16, &[1, 2, 3, 4]);
        assert_eq!(buffer.channel(1, (UNIVERSE_SIZE - 1) as u16), 1);
        assert_eq!(buffer.channel(1, UNIVERSE_SIZE as u16), 2);
        // Everything past channel 512 is dropped.
        assert_eq!(buffer.universe(1).unwrap().len(), UNIVERSE_SIZE);
    }

    #[test]
    fn test_unknown_universe_reads_zero() {
        let buffer = UniverseBuffer::new();
        assert_eq!(buffer.channel(9, 1), 0);
    }
}
