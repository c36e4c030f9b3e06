// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Registry of tags known in CR2 files.
//!
//! The registry covers TIFF baseline tags, the Exif tags CR2 writers
//! use and the Canon MakerNote tags. Canon MakerNote identifiers live in
//! the same 16-bit space as TIFF tags, both are keyed by the raw id.

use std::collections::HashMap;
use std::fmt::Display;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Any type usable as tag id for lookups
pub trait TiffTag: Into<u16> + Copy {}

impl TiffTag for u16 {}

macro_rules! cr2_tags {
  ($($(#[$doc:meta])* $variant:ident = $id:literal => $name:literal,)+) => {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, enumn::N)]
    #[repr(u16)]
    pub enum Cr2Tag {
      $($(#[$doc])* $variant = $id,)+
    }

    impl Cr2Tag {
      /// All known tags in ascending id order
      pub const ALL: &'static [Cr2Tag] = &[$(Cr2Tag::$variant,)+];

      /// Semantic field name of this tag
      pub fn name(&self) -> &'static str {
        match self {
          $(Cr2Tag::$variant => $name,)+
        }
      }
    }
  };
}

cr2_tags! {
  CanonCameraSettings = 0x0001 => "canon_camera_settings",
  CanonFocalLength = 0x0002 => "canon_focal_length",
  CanonShotInfo = 0x0004 => "canon_shot_info",
  CanonPanorama = 0x0005 => "canon_panorama",
  CanonImageType = 0x0006 => "canon_image_type",
  CanonFirmwareVersion = 0x0007 => "canon_firmware_version",
  FileNumber = 0x0008 => "file_number",
  OwnerName = 0x0009 => "owner_name",
  SerialNumber = 0x000c => "serial_number",
  CanonCameraInfo = 0x000d => "canon_camera_info",
  CanonFileLength = 0x000e => "canon_file_length",
  CustomFunctions = 0x000f => "custom_functions",
  CanonModelId = 0x0010 => "canon_model_id",
  CanonMovieInfo = 0x0011 => "canon_movie_info",
  CanonAfInfo = 0x0012 => "canon_af_info",
  ThumbnailImageValidArea = 0x0013 => "thumbnail_image_valid_area",
  SerialNumberFormat = 0x0015 => "serial_number_format",
  SuperMacro = 0x001a => "super_macro",
  DateStampMode = 0x001c => "date_stamp_mode",
  MyColors = 0x001d => "my_colors",
  FirmwareRevision = 0x001e => "firmware_revision",
  Categories = 0x0023 => "categories",
  FaceDetection1 = 0x0024 => "face_detection_1",
  FaceDetection2 = 0x0025 => "face_detection_2",
  CanonAfInfo2 = 0x0026 => "canon_af_info_2",
  ContrastInfo = 0x0027 => "contrast_info",
  ImageUniqueId = 0x0028 => "image_unique_id",
  FaceDetection3 = 0x002f => "face_detection_3",
  TimeInfo = 0x0035 => "time_info",
  CanonAfInfo3 = 0x003c => "canon_af_info_3",
  RawDataOffset = 0x0081 => "raw_data_offset",
  OriginalDecisionDataOffset = 0x0083 => "original_decision_data_offset",
  LensModel = 0x0095 => "lens_model",
  SerialInfo = 0x0096 => "serial_info",
  ColorTemperature = 0x00ae => "color_temperature",
  /// 1 = sRGB, 2 = Adobe RGB
  ColorSpace = 0x00b4 => "color_space",
  ImageWidth = 0x0100 => "image_width",
  ImageLength = 0x0101 => "image_length",
  BitsPerSample = 0x0102 => "bits_per_sample",
  Compression = 0x0103 => "compression",
  PhotometricInterpretation = 0x0106 => "photometric_interpretation",
  Make = 0x010f => "make",
  Model = 0x0110 => "model",
  StripOffset = 0x0111 => "strip_offset",
  Orientation = 0x0112 => "orientation",
  SamplesPerPixel = 0x0115 => "samples_per_pixel",
  RowsPerStrip = 0x0116 => "row_per_strip",
  StripByteCounts = 0x0117 => "strip_byte_counts",
  XResolution = 0x011a => "x_resolution",
  YResolution = 0x011b => "y_resolution",
  PlanarConfiguration = 0x011c => "planar_configuration",
  ResolutionUnit = 0x0128 => "resolution_unit",
  DateTime = 0x0132 => "datetime",
  ThumbnailOffset = 0x0201 => "thumbnail_offset",
  ThumbnailLength = 0x0202 => "thumbnail_length",
  CustomPictureStyleFileName = 0x4010 => "custom_picture_style_file_name",
  AmbienceInfo = 0x4020 => "ambience_info",
  ExposureTime = 0x829a => "exposure_time",
  FNumber = 0x829d => "fnumber",
  /// Pointer to the Exif IFD
  Exif = 0x8769 => "exif",
  ExposureProgram = 0x8822 => "exposure_program",
  /// Pointer to the GPS IFD
  GpsData = 0x8825 => "gps_data",
  IsoSpeedRatings = 0x8827 => "iso_speed_ratings",
  ExifVersion = 0x9000 => "exif_version",
  DateTimeOriginal = 0x9003 => "datetime_original",
  DateTimeDigitized = 0x9004 => "datetime_digitized",
  ShutterSpeedValue = 0x9201 => "shutter_speed_value",
  ApertureValue = 0x9202 => "aperture_value",
  ExposureBiasValue = 0x9204 => "exposure_bias_value",
  MeteringMode = 0x9207 => "metering_mode",
  Flash = 0x9209 => "flash",
  FocalLength = 0x920a => "focal_length",
  /// Canon MakerNote, a plain IFD stored as UNDEFINED blob
  Makernote = 0x927c => "makernote",
  UserComment = 0x9286 => "user_comment",
  ColorSpaceExif = 0xa001 => "exif_color_space",
  PixelXDimension = 0xa002 => "pixel_x_dimension",
  PixelYDimension = 0xa003 => "pixel_y_dimension",
  /// Canon slice layout of the raw sensor data
  Cr2Slice = 0xc640 => "cr2_slice",
}

/// Tags whose value is the offset of a nested IFD
pub const SUB_DIRECTORY_TAGS: [Cr2Tag; 3] = [Cr2Tag::Exif, Cr2Tag::GpsData, Cr2Tag::Makernote];

lazy_static! {
  static ref NAME_TABLE: HashMap<&'static str, Cr2Tag> = Cr2Tag::ALL.iter().map(|tag| (tag.name(), *tag)).collect();
}

impl Cr2Tag {
  /// Reverse lookup by semantic field name
  pub fn from_name(name: &str) -> Option<Cr2Tag> {
    NAME_TABLE.get(name).copied()
  }

  pub fn is_sub_directory(&self) -> bool {
    SUB_DIRECTORY_TAGS.contains(self)
  }
}

impl From<Cr2Tag> for u16 {
  fn from(tag: Cr2Tag) -> Self {
    tag as u16
  }
}

impl TiffTag for Cr2Tag {}

impl Display for Cr2Tag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// Resolved key of a directory field.
///
/// Tags unknown to the registry keep their numeric id, so no
/// entry gets lost during decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagKey {
  Known(Cr2Tag),
  Numeric(u16),
}

impl TagKey {
  pub fn id(&self) -> u16 {
    match *self {
      Self::Known(tag) => tag.into(),
      Self::Numeric(id) => id,
    }
  }

  pub fn tag(&self) -> Option<Cr2Tag> {
    match *self {
      Self::Known(tag) => Some(tag),
      Self::Numeric(_) => None,
    }
  }
}

impl From<u16> for TagKey {
  fn from(id: u16) -> Self {
    match Cr2Tag::n(id) {
      Some(tag) => Self::Known(tag),
      None => Self::Numeric(id),
    }
  }
}

impl From<Cr2Tag> for TagKey {
  fn from(tag: Cr2Tag) -> Self {
    Self::Known(tag)
  }
}

impl Display for TagKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Known(tag) => f.write_str(tag.name()),
      Self::Numeric(id) => f.write_fmt(format_args!("0x{:04x}", id)),
    }
  }
}
