use crate::config::ProtocolConfig;
use crate::error::PotentiostatError;
use crate::potentiostat::Potentiostat;
use serialport::{SerialPortInfo, SerialPortType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentiostatDevice {
    pub name: String,
    pub port: String,
}

impl PotentiostatDevice {
    pub fn new(name: String, port: String) -> Self {
        Self { name, port }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Potentiostat error: {0}")]
    Potentiostat(#[from] PotentiostatError),

    #[error("Serial port enumeration failed: {0}")]
    Enumeration(#[from] serialport::Error),

    #[error("No potentiostat found. Please connect one or specify the port manually")]
    DeviceNotFound,
}

pub struct PotentiostatConnector;

impl PotentiostatConnector {
    /// Connect to a potentiostat.
    ///
    /// With an explicit `port` that port is opened directly. Otherwise every
    /// USB serial port is tried in turn until one completes the handshake.
    pub fn connect(
        port: Option<&str>,
        config: ProtocolConfig,
    ) -> Result<Potentiostat, ConnectorError> {
        if let Some(port) = port {
            return Ok(Potentiostat::connect(port, config)?);
        }

        let devices = Self::get_available_devices()?;
        if devices.is_empty() {
            return Err(ConnectorError::DeviceNotFound);
        }

        for device in devices {
            log::debug!("Trying {} at {}", device.name, device.port);
            match Potentiostat::connect(&device.port, config.clone()) {
                Ok(pot) => return Ok(pot),
                Err(e @ (PotentiostatError::Timeout { .. } | PotentiostatError::Connection(_))) => {
                    log::debug!("{} is not answering like a potentiostat: {}", device.port, e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ConnectorError::DeviceNotFound)
    }

    /// All USB serial ports, the candidates for a potentiostat.
    pub fn get_available_devices() -> Result<Vec<PotentiostatDevice>, ConnectorError> {
        let ports = serialport::available_ports()?;
        Ok(ports.iter().filter_map(Self::candidate).collect())
    }

    fn candidate(info: &SerialPortInfo) -> Option<PotentiostatDevice> {
        match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                let name = usb
                    .product
                    .clone()
                    .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid));
                Some(PotentiostatDevice::new(name, info.port_name.clone()))
            }
            _ => None,
        }
    }
}
