//! Floor Control – Exklusives Rederecht pro Raum
//!
//! Pro privatem Raum haelt der Server hoechstens einen Sprecher. Wer zuerst
//! anfragt, bekommt das Mikrofon; spaetere Anfragen werden still abgelehnt.
//! Freigeben kann nur der aktuelle Halter selbst.
//!
//! Der Eintrag eines Raums entsteht (leer) mit `accept-call` und verschwindet
//! mit `end-call`. Raeume ohne Eintrag haben keinen aktiven Anruf; dort gibt
//! es kein Rederecht.

use std::collections::HashMap;

/// Ergebnis einer Floor-Anfrage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorErgebnis {
    /// Anfragender haelt jetzt (oder weiterhin) das Mikrofon
    Erteilt,
    /// Jemand anderes spricht bereits
    Abgelehnt { halter: String },
    /// Raum hat keinen Floor-Eintrag (kein aktiver Anruf)
    KeinAnruf,
}

/// Floor-Zustand aller Raeume
#[derive(Debug, Default)]
pub struct FloorControl {
    /// Raum -> aktueller Sprecher (None = Mikrofon frei)
    halter: HashMap<String, Option<String>>,
}

impl FloorControl {
    /// Erstellt einen leeren Floor-Zustand
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt den Eintrag eines Raums an bzw. setzt ihn auf frei zurueck
    pub fn raum_initialisieren(&mut self, raum: &str) {
        self.halter.insert(raum.to_owned(), None);
    }

    /// Entfernt den Eintrag eines Raums
    pub fn raum_entfernen(&mut self, raum: &str) -> bool {
        self.halter.remove(raum).is_some()
    }

    /// Prueft ob der Raum einen Floor-Eintrag hat
    pub fn ist_initialisiert(&self, raum: &str) -> bool {
        self.halter.contains_key(raum)
    }

    /// Fordert das Mikrofon fuer `username` an
    ///
    /// Erteilt wenn frei oder bereits von `username` gehalten.
    pub fn anfordern(&mut self, raum: &str, username: &str) -> FloorErgebnis {
        let Some(halter) = self.halter.get_mut(raum) else {
            return FloorErgebnis::KeinAnruf;
        };

        if let Some(aktuell) = halter.as_deref() {
            if aktuell != username {
                return FloorErgebnis::Abgelehnt {
                    halter: aktuell.to_owned(),
                };
            }
        }

        *halter = Some(username.to_owned());
        FloorErgebnis::Erteilt
    }

    /// Gibt das Mikrofon frei, aber nur wenn `username` der Halter ist
    ///
    /// Eine verspaetete Freigabe loescht so nie das Rederecht eines anderen.
    pub fn freigeben(&mut self, raum: &str, username: &str) -> bool {
        match self.halter.get_mut(raum) {
            Some(halter) if halter.as_deref() == Some(username) => {
                *halter = None;
                true
            }
            _ => false,
        }
    }

    /// Aktueller Sprecher eines Raums
    pub fn halter(&self, raum: &str) -> Option<&str> {
        self.halter.get(raum)?.as_deref()
    }

    /// Anzahl der Raeume mit Floor-Eintrag
    pub fn raum_anzahl(&self) -> usize {
        self.halter.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_mit_raum(raum: &str) -> FloorControl {
        let mut floor = FloorControl::neu();
        floor.raum_initialisieren(raum);
        floor
    }

    #[test]
    fn erster_sprecher_gewinnt() {
        let mut floor = floor_mit_raum("r");

        assert_eq!(floor.anfordern("r", "A"), FloorErgebnis::Erteilt);
        assert_eq!(
            floor.anfordern("r", "B"),
            FloorErgebnis::Abgelehnt { halter: "A".into() }
        );
        assert_eq!(floor.halter("r"), Some("A"));
    }

    #[test]
    fn halter_darf_erneut_anfordern() {
        let mut floor = floor_mit_raum("r");
        floor.anfordern("r", "A");
        assert_eq!(floor.anfordern("r", "A"), FloorErgebnis::Erteilt);
    }

    #[test]
    fn nur_halter_kann_freigeben() {
        let mut floor = floor_mit_raum("r");
        floor.anfordern("r", "A");

        assert!(!floor.freigeben("r", "B"), "fremde Freigabe muss wirkungslos sein");
        assert_eq!(floor.halter("r"), Some("A"));

        assert!(floor.freigeben("r", "A"));
        assert_eq!(floor.halter("r"), None);
        assert!(!floor.freigeben("r", "A"), "doppelte Freigabe ist wirkungslos");
    }

    #[test]
    fn ohne_eintrag_kein_rederecht() {
        let mut floor = FloorControl::neu();
        assert_eq!(floor.anfordern("lobby", "A"), FloorErgebnis::KeinAnruf);
        assert!(!floor.freigeben("lobby", "A"));
        assert!(!floor.ist_initialisiert("lobby"));
    }

    #[test]
    fn initialisieren_setzt_zurueck() {
        let mut floor = floor_mit_raum("r");
        floor.anfordern("r", "A");
        floor.raum_initialisieren("r");
        assert_eq!(floor.halter("r"), None);
        assert!(floor.ist_initialisiert("r"));
    }

    #[test]
    fn raum_entfernen() {
        let mut floor = floor_mit_raum("r");
        floor.anfordern("r", "A");
        assert!(floor.raum_entfernen("r"));
        assert!(!floor.raum_entfernen("r"));
        assert_eq!(floor.raum_anzahl(), 0);
        assert_eq!(floor.anfordern("r", "A"), FloorErgebnis::KeinAnruf);
    }

    #[test]
    fn raeume_sind_unabhaengig() {
        let mut floor = floor_mit_raum("r1");
        floor.raum_initialisieren("r2");

        assert_eq!(floor.anfordern("r1", "A"), FloorErgebnis::Erteilt);
        assert_eq!(floor.anfordern("r2", "B"), FloorErgebnis::Erteilt);
        assert_eq!(floor.halter("r1"), Some("A"));
        assert_eq!(floor.halter("r2"), Some("B"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const BENUTZER: [&str; 3] = ["A", "B", "C"];

        proptest! {
            // Jede Folge von Anfragen und Freigaben gegen ein Ein-Halter-Modell
            #[test]
            fn beliebige_folgen_halten_hoechstens_einen_sprecher(
                schritte in proptest::collection::vec((0..3usize, any::<bool>()), 0..200)
            ) {
                let mut floor = floor_mit_raum("r");
                let mut modell: Option<&str> = None;

                for (index, anfordern) in schritte {
                    let wer = BENUTZER[index];

                    if anfordern {
                        let ergebnis = floor.anfordern("r", wer);
                        match modell {
                            Some(h) if h != wer => prop_assert_eq!(
                                ergebnis,
                                FloorErgebnis::Abgelehnt { halter: h.to_owned() }
                            ),
                            _ => {
                                prop_assert_eq!(ergebnis, FloorErgebnis::Erteilt);
                                modell = Some(wer);
                            }
                        }
                    } else {
                        let freigegeben = floor.freigeben("r", wer);
                        prop_assert_eq!(freigegeben, modell == Some(wer));
                        if freigegeben {
                            modell = None;
                        }
                    }

                    prop_assert_eq!(floor.halter("r"), modell);
                }
            }
        }
    }
}
