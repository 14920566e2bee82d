use crate::error::Error;
use reqwest::Certificate;
use std::{fs::File, io::Read, path::Path};

/// Builds the HTTP client used to talk to the admin API.
#[derive(Default)]
pub struct ClientFactory {
    insecure: bool,
    ca_certs: Vec<String>,
}

impl ClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_insecure(mut self) -> Self {
        self.insecure = true;
        self
    }

    pub fn add_ca_certs<I, S>(mut self, certs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ca_certs.extend(certs.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<reqwest::Client, Error> {
        let mut client = reqwest::ClientBuilder::new();

        if self.insecure {
            client = make_insecure(client);
        }

        for cert in &self.ca_certs {
            client = add_cert(client, cert)?;
        }

        Ok(client.build()?)
    }
}

fn add_cert<P: AsRef<Path>>(
    mut client: reqwest::ClientBuilder,
    cert: P,
) -> Result<reqwest::ClientBuilder, Error> {
    let cert = cert.as_ref();
    log::info!("Adding root certificate: {:?}", cert);
    let mut file = File::open(cert)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;

    let pems = pem::parse_many(buf)
        .map_err(|err| Error::Internal(format!("Failed to parse {cert:?}: {err}")))?;

    log::info!("Found {} certificates", pems.len());

    // we need rustls for adding root certificates
    client = client.use_rustls_tls();

    for pem in pems {
        let cert = Certificate::from_pem(pem::encode(&pem).as_bytes())?;
        client = client.add_root_certificate(cert);
    }

    Ok(client)
}

fn make_insecure(client: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
    log::warn!("Disabling TLS verification for client. Do not use this in production!");
    // with rustls, this also skips the hostname check
    client.use_rustls_tls().danger_accept_invalid_certs(true)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_insecure_client() {
        assert!(ClientFactory::new().make_insecure().build().is_ok());
    }

    #[test]
    fn test_missing_cert() {
        let result = ClientFactory::new()
            .add_ca_certs(["/does/not/exist.pem"])
            .build();
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
