//! Self-signed certificates generated on the fly for TLS tests.

use std::io::Write;

use native_tls::{Identity, TlsAcceptor};
use rcgen::{CertifiedKey, generate_simple_self_signed};
use tempfile::NamedTempFile;

/// A self-signed certificate and its PKCS#8 private key, both PEM encoded.
#[derive(Clone, Debug)]
pub struct TestCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

impl TestCertificate {
    /// Generate a certificate valid for `names`. IP literals become IP
    /// subject alternative names, everything else DNS names.
    pub fn generate(names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|name| (*name).to_owned()).collect();
        let CertifiedKey { cert, key_pair } =
            generate_simple_self_signed(names).expect("generate self-signed certificate");
        Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
        }
    }

    /// Server identity presenting this certificate.
    pub fn identity(&self) -> Identity {
        Identity::from_pkcs8(self.cert_pem.as_bytes(), self.key_pem.as_bytes())
            .expect("build TLS identity")
    }

    /// TLS acceptor presenting this certificate.
    pub fn acceptor(&self) -> TlsAcceptor {
        TlsAcceptor::new(self.identity()).expect("build TLS acceptor")
    }

    /// Write the certificate to a temporary file usable as a CA bundle.
    pub fn ca_file(&self) -> NamedTempFile {
        Self::bundle_file(&[self])
    }

    /// Write several certificates, in order, into one CA bundle file.
    pub fn bundle_file(certs: &[&TestCertificate]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create CA file");
        for cert in certs {
            file.write_all(cert.cert_pem.as_bytes())
                .expect("write CA file");
        }
        file
    }
}
